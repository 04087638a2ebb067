//! Connection manager configuration.

use std::time::Duration;

use padlink_hid_common::{HidError, HidResult};
use padlink_hid_dualsense_protocol::{BatteryDecodeMode, SONY_VENDOR_ID, product_ids};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_POLL_YIELD_US: u64 = 500;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Wait between failed discovery or connection attempts.
    pub retry_delay_ms: u64,
    /// Pause between two polls of a connected device.
    pub poll_yield_us: u64,
    /// Upper bound on a single blocking read.
    pub read_timeout_ms: u64,
    /// Capacity of the broadcast event channel.
    pub event_capacity: usize,
    pub battery_mode: BatteryDecodeMode,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            vendor_id: SONY_VENDOR_ID,
            product_id: product_ids::DUALSENSE,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            poll_yield_us: DEFAULT_POLL_YIELD_US,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            battery_mode: BatteryDecodeMode::default(),
        }
    }
}

impl ConnectionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn poll_yield(&self) -> Duration {
        Duration::from_micros(self.poll_yield_us)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// # Errors
    ///
    /// [`HidError::InvalidArgument`] naming the first offending field.
    pub fn validate(&self) -> HidResult<()> {
        if self.retry_delay_ms == 0 {
            return Err(HidError::invalid("retry_delay_ms must be greater than zero"));
        }
        if self.read_timeout_ms == 0 {
            return Err(HidError::invalid("read_timeout_ms must be greater than zero"));
        }
        if self.event_capacity == 0 {
            return Err(HidError::invalid("event_capacity must be greater than zero"));
        }
        Ok(())
    }
}
