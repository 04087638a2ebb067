//! Devices found during enumeration

use serde::{Deserialize, Serialize};

/// One openable device matching the requested vendor/product pair.
///
/// `input_report_len` is what the provider knows about the device's input
/// report size; the connection manager uses it to pick the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCandidate {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub input_report_len: usize,
    pub serial_number: Option<String>,
    pub product_name: Option<String>,
}

impl DeviceCandidate {
    pub fn new(
        path: impl Into<String>,
        vendor_id: u16,
        product_id: u16,
        input_report_len: usize,
    ) -> Self {
        Self {
            path: path.into(),
            vendor_id,
            product_id,
            input_report_len,
            serial_number: None,
            product_name: None,
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_creation() {
        let candidate = DeviceCandidate::new("/dev/hidraw3", 0x054C, 0x0CE6, 64);
        assert_eq!(candidate.path, "/dev/hidraw3");
        assert_eq!(candidate.input_report_len, 64);
        assert!(candidate.matches(0x054C, 0x0CE6));
        assert!(!candidate.matches(0x054C, 0x09CC));
    }

    #[test]
    fn test_candidate_display_name() {
        let candidate = DeviceCandidate::new("/dev/hidraw3", 0x054C, 0x0CE6, 78)
            .with_product_name("DualSense Wireless Controller");
        assert_eq!(candidate.display_name(), "DualSense Wireless Controller");

        let candidate = DeviceCandidate::new("/dev/hidraw3", 0x054C, 0x0CE6, 78);
        assert_eq!(candidate.display_name(), "054c:0ce6");
    }

    #[test]
    fn test_candidate_serializes() -> Result<(), serde_json::Error> {
        let candidate =
            DeviceCandidate::new("usb-1", 0x054C, 0x0CE6, 64).with_serial("a0:ab:51:00:00:01");
        let json = serde_json::to_string(&candidate)?;
        let back: DeviceCandidate = serde_json::from_str(&json)?;
        assert_eq!(back, candidate);
        Ok(())
    }
}
