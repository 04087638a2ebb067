//! hidapi-backed transport provider.
//!
//! hidapi does not expose input report sizes, so the provider derives
//! `input_report_len` from the bus type: USB devices report 64 bytes and
//! Bluetooth devices 78. Devices on any other bus get a length of zero and are
//! skipped by the connection manager.

use std::ffi::CString;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use hidapi::{BusType, HidApi, HidDevice};

use crate::{DeviceCandidate, DeviceHandle, HidError, HidResult, TransportProvider};

const USB_INPUT_REPORT_LEN: usize = 64;
const BLUETOOTH_INPUT_REPORT_LEN: usize = 78;

/// Upper bound on reports discarded by one flush.
const MAX_FLUSH_REPORTS: usize = 64;

fn removed(err: hidapi::HidError) -> HidError {
    HidError::removed(err.to_string())
}

pub struct HidapiProvider {
    api: Mutex<HidApi>,
}

impl HidapiProvider {
    /// Initialise the OS HID stack.
    ///
    /// # Errors
    ///
    /// [`HidError::Io`] if hidapi fails to initialise.
    pub fn new() -> HidResult<Self> {
        let api = HidApi::new().map_err(|e| HidError::Io(std::io::Error::other(e.to_string())))?;
        Ok(Self {
            api: Mutex::new(api),
        })
    }

    fn api(&self) -> MutexGuard<'_, HidApi> {
        self.api.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn input_report_len(bus: BusType) -> usize {
    match bus {
        BusType::Usb => USB_INPUT_REPORT_LEN,
        BusType::Bluetooth => BLUETOOTH_INPUT_REPORT_LEN,
        _ => 0,
    }
}

impl TransportProvider for HidapiProvider {
    fn enumerate(&self, vendor_id: u16, product_id: u16) -> HidResult<Vec<DeviceCandidate>> {
        let mut api = self.api();
        if let Err(e) = api.refresh_devices() {
            tracing::warn!(error = %e, "Failed to refresh HID device list");
        }

        let found: Vec<DeviceCandidate> = api
            .device_list()
            .filter(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
            .map(|d| {
                let mut candidate = DeviceCandidate::new(
                    d.path().to_string_lossy(),
                    d.vendor_id(),
                    d.product_id(),
                    input_report_len(d.bus_type()),
                );
                if let Some(name) = d.product_string() {
                    candidate = candidate.with_product_name(name);
                }
                if let Some(serial) = d.serial_number() {
                    candidate = candidate.with_serial(serial);
                }
                candidate
            })
            .collect();

        tracing::debug!(count = found.len(), "Enumerated HID devices");
        if found.is_empty() {
            return Err(HidError::TransportUnavailable {
                vendor_id,
                product_id,
            });
        }
        Ok(found)
    }

    fn open(&self, path: &str) -> HidResult<Box<dyn DeviceHandle>> {
        if path.is_empty() {
            return Err(HidError::invalid("device path is empty"));
        }
        let c_path = CString::new(path)
            .map_err(|e| HidError::invalid(format!("device path contains NUL: {e}")))?;
        let device = self.api().open_path(&c_path).map_err(removed)?;
        Ok(Box::new(HidapiHandle { device }))
    }
}

/// Open hidapi device. Closed on drop.
pub struct HidapiHandle {
    device: HidDevice,
}

impl DeviceHandle for HidapiHandle {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> HidResult<usize> {
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        self.device.read_timeout(buf, timeout_ms).map_err(removed)
    }

    fn write(&mut self, data: &[u8]) -> HidResult<usize> {
        self.device.write(data).map_err(removed)
    }

    fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        self.device.get_feature_report(buf).map_err(removed)
    }

    fn flush_queue(&mut self) -> HidResult<()> {
        let mut scratch = [0u8; BLUETOOTH_INPUT_REPORT_LEN];
        for _ in 0..MAX_FLUSH_REPORTS {
            if self.device.read_timeout(&mut scratch, 0).map_err(removed)? == 0 {
                return Ok(());
            }
        }
        Ok(())
    }
}
