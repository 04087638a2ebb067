//! Transport provider and device handle traits

use std::time::Duration;

use crate::{DeviceCandidate, HidResult};

/// Discovers and opens devices.
pub trait TransportProvider: Send + Sync {
    /// List devices matching `vendor_id`/`product_id`.
    ///
    /// # Errors
    ///
    /// [`HidError::TransportUnavailable`](crate::HidError::TransportUnavailable)
    /// when nothing matches, or an I/O error from the OS stack.
    fn enumerate(&self, vendor_id: u16, product_id: u16) -> HidResult<Vec<DeviceCandidate>>;

    /// Open the device at `path`.
    ///
    /// # Errors
    ///
    /// [`HidError::InvalidArgument`](crate::HidError::InvalidArgument) for an
    /// empty path, [`HidError::DeviceRemoved`](crate::HidError::DeviceRemoved)
    /// if the device cannot be opened.
    fn open(&self, path: &str) -> HidResult<Box<dyn DeviceHandle>>;
}

/// An open device. Dropping the handle releases it.
pub trait DeviceHandle: Send {
    /// Read one input report into `buf`, waiting at most `timeout`.
    ///
    /// Returns `Ok(0)` if no report arrived in time.
    ///
    /// # Errors
    ///
    /// [`HidError::DeviceRemoved`](crate::HidError::DeviceRemoved) if the
    /// device went away.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> HidResult<usize>;

    /// Write one output report.
    ///
    /// # Errors
    ///
    /// [`HidError::DeviceRemoved`](crate::HidError::DeviceRemoved) if the
    /// device went away.
    fn write(&mut self, data: &[u8]) -> HidResult<usize>;

    /// Request a feature report. `buf[0]` holds the report id on entry.
    ///
    /// # Errors
    ///
    /// Any transport error; the caller decides how to classify it.
    fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize>;

    /// Discard input reports queued by the OS. Best-effort.
    ///
    /// # Errors
    ///
    /// Returned when the platform cannot flush; callers log and continue.
    fn flush_queue(&mut self) -> HidResult<()>;
}

pub mod mock {
    //! Scripted in-memory transport.
    //!
    //! A [`MockDevice`] holds shared state, so the test keeps one clone to
    //! script reads and inspect writes while the code under test owns the
    //! handle opened through [`MockProvider`].

    use super::*;
    use crate::HidError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// One scripted outcome of [`DeviceHandle::read`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MockRead {
        Report(Vec<u8>),
        Timeout,
        Fail,
    }

    #[derive(Debug)]
    struct MockState {
        reads: VecDeque<MockRead>,
        /// Returned once the script is exhausted; `None` means timeout.
        idle_report: Option<Vec<u8>>,
        write_history: Vec<Vec<u8>>,
        failing_writes: usize,
        feature_report: Option<Vec<u8>>,
        feature_requests: Vec<u8>,
        flush_supported: bool,
        flush_calls: usize,
        connected: bool,
        open_count: usize,
    }

    #[derive(Debug, Clone)]
    pub struct MockDevice {
        candidate: DeviceCandidate,
        state: Arc<Mutex<MockState>>,
        live_handles: Arc<AtomicUsize>,
    }

    impl MockDevice {
        pub fn new(candidate: DeviceCandidate) -> Self {
            Self {
                candidate,
                state: Arc::new(Mutex::new(MockState {
                    reads: VecDeque::new(),
                    idle_report: None,
                    write_history: Vec::new(),
                    failing_writes: 0,
                    feature_report: None,
                    feature_requests: Vec::new(),
                    flush_supported: true,
                    flush_calls: 0,
                    connected: true,
                    open_count: 0,
                })),
                live_handles: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn candidate(&self) -> &DeviceCandidate {
            &self.candidate
        }

        pub fn queue_read(&self, read: MockRead) {
            self.lock().reads.push_back(read);
        }

        pub fn queue_report(&self, data: Vec<u8>) {
            self.queue_read(MockRead::Report(data));
        }

        pub fn queue_failures(&self, count: usize) {
            let mut state = self.lock();
            for _ in 0..count {
                state.reads.push_back(MockRead::Fail);
            }
        }

        /// Report returned on every read once the script runs dry.
        pub fn set_idle_report(&self, data: Option<Vec<u8>>) {
            self.lock().idle_report = data;
        }

        pub fn fail_next_writes(&self, count: usize) {
            self.lock().failing_writes = count;
        }

        /// Content returned by [`DeviceHandle::get_feature_report`]; `None`
        /// makes the request fail.
        pub fn set_feature_report(&self, data: Option<Vec<u8>>) {
            self.lock().feature_report = data;
        }

        pub fn set_flush_supported(&self, supported: bool) {
            self.lock().flush_supported = supported;
        }

        pub fn disconnect(&self) {
            self.lock().connected = false;
        }

        pub fn reconnect(&self) {
            self.lock().connected = true;
        }

        pub fn is_connected(&self) -> bool {
            self.lock().connected
        }

        pub fn write_history(&self) -> Vec<Vec<u8>> {
            self.lock().write_history.clone()
        }

        pub fn feature_requests(&self) -> Vec<u8> {
            self.lock().feature_requests.clone()
        }

        pub fn flush_calls(&self) -> usize {
            self.lock().flush_calls
        }

        pub fn pending_reads(&self) -> usize {
            self.lock().reads.len()
        }

        /// Number of successful `open` calls so far.
        pub fn open_count(&self) -> usize {
            self.lock().open_count
        }

        /// Handles currently open and not yet dropped.
        pub fn live_handles(&self) -> usize {
            self.live_handles.load(Ordering::SeqCst)
        }

        fn open_handle(&self) -> HidResult<MockHandle> {
            let mut state = self.lock();
            if !state.connected {
                return Err(HidError::removed(format!(
                    "{} is not connected",
                    self.candidate.path
                )));
            }
            state.open_count += 1;
            self.live_handles.fetch_add(1, Ordering::SeqCst);
            Ok(MockHandle {
                device: self.clone(),
            })
        }
    }

    /// Handle returned by [`MockProvider::open`].
    #[derive(Debug)]
    pub struct MockHandle {
        device: MockDevice,
    }

    impl Drop for MockHandle {
        fn drop(&mut self) {
            self.device.live_handles.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl DeviceHandle for MockHandle {
        fn read(&mut self, buf: &mut [u8], timeout: Duration) -> HidResult<usize> {
            let next = {
                let mut state = self.device.lock();
                if !state.connected {
                    return Err(HidError::removed("mock device disconnected"));
                }
                match state.reads.pop_front() {
                    Some(read) => read,
                    None => state
                        .idle_report
                        .clone()
                        .map_or(MockRead::Timeout, MockRead::Report),
                }
            };

            match next {
                MockRead::Report(data) => {
                    let n = data.len().min(buf.len());
                    if let (Some(dst), Some(src)) = (buf.get_mut(..n), data.get(..n)) {
                        dst.copy_from_slice(src);
                    }
                    Ok(n)
                }
                MockRead::Timeout => {
                    std::thread::sleep(timeout.min(Duration::from_millis(2)));
                    Ok(0)
                }
                MockRead::Fail => Err(HidError::removed("scripted read failure")),
            }
        }

        fn write(&mut self, data: &[u8]) -> HidResult<usize> {
            let mut state = self.device.lock();
            if !state.connected {
                return Err(HidError::removed("mock device disconnected"));
            }
            if state.failing_writes > 0 {
                state.failing_writes -= 1;
                return Err(HidError::removed("scripted write failure"));
            }
            state.write_history.push(data.to_vec());
            Ok(data.len())
        }

        fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
            let mut state = self.device.lock();
            if let Some(&id) = buf.first() {
                state.feature_requests.push(id);
            }
            let Some(report) = state.feature_report.as_ref() else {
                return Err(HidError::removed("feature report not available"));
            };
            let n = report.len().min(buf.len());
            if let (Some(dst), Some(src)) = (buf.get_mut(..n), report.get(..n)) {
                dst.copy_from_slice(src);
            }
            Ok(n)
        }

        fn flush_queue(&mut self) -> HidResult<()> {
            let mut state = self.device.lock();
            state.flush_calls += 1;
            if state.flush_supported {
                Ok(())
            } else {
                Err(HidError::Io(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "flush not supported",
                )))
            }
        }
    }

    /// Provider over a fixed set of [`MockDevice`]s.
    #[derive(Debug, Default)]
    pub struct MockProvider {
        devices: Mutex<Vec<MockDevice>>,
        enumerate_calls: AtomicUsize,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_device(&self, device: MockDevice) {
            self.devices
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(device);
        }

        pub fn remove_device(&self, path: &str) {
            self.devices
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|d| d.candidate.path != path);
        }

        pub fn device_count(&self) -> usize {
            self.devices.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        pub fn enumerate_calls(&self) -> usize {
            self.enumerate_calls.load(Ordering::SeqCst)
        }
    }

    impl TransportProvider for MockProvider {
        fn enumerate(&self, vendor_id: u16, product_id: u16) -> HidResult<Vec<DeviceCandidate>> {
            self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
            let found: Vec<DeviceCandidate> = self
                .devices
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .filter(|d| d.candidate.matches(vendor_id, product_id) && d.is_connected())
                .map(|d| d.candidate.clone())
                .collect();
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
            let device = self
                .devices
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .find(|d| d.candidate.path == path)
                .cloned();
            match device {
                Some(device) => Ok(Box::new(device.open_handle()?)),
                None => Err(HidError::removed(format!("no device at {path}"))),
            }
        }
    }
}
