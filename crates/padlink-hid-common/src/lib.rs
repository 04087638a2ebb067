//! Transport seam shared by the padlink crates.
//!
//! Everything that touches the operating system's HID stack sits behind the
//! [`TransportProvider`] and [`DeviceHandle`] traits. The connection manager
//! only ever talks to these traits, so it can be driven by the scripted
//! [`mock`] provider in tests and by the hidapi-backed provider (feature
//! `hidapi`) in production.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod candidate;
#[cfg(feature = "hidapi")]
pub mod hidapi_provider;
pub mod transport;

pub use candidate::*;
pub use transport::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidError {
    #[error("No device available for {vendor_id:04x}:{product_id:04x}")]
    TransportUnavailable { vendor_id: u16, product_id: u16 },

    #[error("Device removed: {0}")]
    DeviceRemoved(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Bluetooth handshake failed: {0}")]
    BluetoothHandshakeFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HidError {
    /// Whether the connection cycle should wait and try again.
    ///
    /// Only argument errors are permanent; everything else is the device or
    /// the OS stack being temporarily unavailable.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }

    pub fn removed(reason: impl Into<String>) -> Self {
        Self::DeviceRemoved(reason.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

pub type HidResult<T> = Result<T, HidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HidError::TransportUnavailable {
            vendor_id: 0x054C,
            product_id: 0x0CE6,
        };
        assert_eq!(format!("{err}"), "No device available for 054c:0ce6");

        let err = HidError::removed("read failed");
        assert_eq!(format!("{err}"), "Device removed: read failed");

        let err = HidError::BluetoothHandshakeFailed("short feature report".to_string());
        assert_eq!(
            format!("{err}"),
            "Bluetooth handshake failed: short feature report"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(
            HidError::TransportUnavailable {
                vendor_id: 0,
                product_id: 0
            }
            .is_retryable()
        );
        assert!(HidError::removed("gone").is_retryable());
        assert!(HidError::BluetoothHandshakeFailed(String::new()).is_retryable());
        assert!(HidError::from(std::io::Error::other("x")).is_retryable());
        assert!(!HidError::invalid("empty path").is_retryable());
    }
}
