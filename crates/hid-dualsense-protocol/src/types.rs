//! Transport classification and fixed-length raw report buffers.

#![deny(static_mut_refs)]

use std::fmt;

use crate::ids::report_ids;

/// Link the controller is attached over.
///
/// The transport alone fixes report lengths, the header prefix and whether
/// output reports carry a checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Transport {
    /// USB cable.
    Wired,
    /// Bluetooth.
    WirelessRadio,
}

impl Transport {
    /// Length of an input report including the report ID.
    pub const fn input_report_len(self) -> usize {
        match self {
            Self::Wired => 64,
            Self::WirelessRadio => 78,
        }
    }

    /// Length of an output report including the header.
    pub const fn output_report_len(self) -> usize {
        match self {
            Self::Wired => 48,
            Self::WirelessRadio => 547,
        }
    }

    /// Offset of the input payload, skipping the report ID (and on
    /// Bluetooth the extra header byte).
    pub const fn input_offset(self) -> usize {
        match self {
            Self::Wired => 1,
            Self::WirelessRadio => 2,
        }
    }

    /// Offset of the output payload.
    pub const fn output_offset(self) -> usize {
        match self {
            Self::Wired => 1,
            Self::WirelessRadio => 2,
        }
    }

    /// Report ID expected at byte 0 of an input report.
    pub const fn input_report_id(self) -> u8 {
        match self {
            Self::Wired => report_ids::USB_INPUT,
            Self::WirelessRadio => report_ids::BT_INPUT,
        }
    }

    /// Report ID written at byte 0 of an output report.
    pub const fn output_report_id(self) -> u8 {
        match self {
            Self::Wired => report_ids::USB_OUTPUT,
            Self::WirelessRadio => report_ids::BT_OUTPUT,
        }
    }

    /// Classify a device by the input report length it advertises.
    pub fn from_input_report_len(len: usize) -> Option<Self> {
        match len {
            64 => Some(Self::Wired),
            78 => Some(Self::WirelessRadio),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wired => "wired",
            Self::WirelessRadio => "wireless-radio",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report direction relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// A fixed-length report buffer.
///
/// Its length is determined by `(transport, direction)` at construction and
/// never changes afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct RawReport {
    transport: Transport,
    direction: Direction,
    bytes: Box<[u8]>,
}

impl RawReport {
    /// Allocate a zero-filled report of the correct length.
    pub fn zeroed(transport: Transport, direction: Direction) -> Self {
        let len = Self::expected_len(transport, direction);
        Self {
            transport,
            direction,
            bytes: vec![0u8; len].into_boxed_slice(),
        }
    }

    /// Copy `bytes` into a report.
    ///
    /// Returns `None` if the length does not match the transport and direction.
    pub fn from_bytes(transport: Transport, direction: Direction, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::expected_len(transport, direction) {
            return None;
        }
        Some(Self {
            transport,
            direction,
            bytes: bytes.into(),
        })
    }

    pub const fn expected_len(transport: Transport, direction: Direction) -> usize {
        match direction {
            Direction::Input => transport.input_report_len(),
            Direction::Output => transport.output_report_len(),
        }
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Offset of the payload inside [`as_bytes`](Self::as_bytes).
    pub fn payload_offset(&self) -> usize {
        match self.direction {
            Direction::Input => self.transport.input_offset(),
            Direction::Output => self.transport.output_offset(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Box<[u8]> {
        self.bytes
    }
}

impl AsRef<[u8]> for RawReport {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for RawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawReport")
            .field("transport", &self.transport)
            .field("direction", &self.direction)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A three-axis motion sample (raw sensor units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_lengths() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(Transport::Wired.input_report_len(), 64);
        assert_eq!(Transport::WirelessRadio.input_report_len(), 78);
        assert_eq!(Transport::Wired.output_report_len(), 48);
        assert_eq!(Transport::WirelessRadio.output_report_len(), 547);
        assert_eq!(Transport::Wired.input_offset(), 1);
        assert_eq!(Transport::WirelessRadio.input_offset(), 2);
        Ok(())
    }

    #[test]
    fn test_transport_classification_by_length() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(Transport::from_input_report_len(64), Some(Transport::Wired));
        assert_eq!(
            Transport::from_input_report_len(78),
            Some(Transport::WirelessRadio)
        );
        assert_eq!(Transport::from_input_report_len(10), None);
        assert_eq!(Transport::from_input_report_len(0), None);
        Ok(())
    }

    #[test]
    fn test_raw_report_fixed_length() -> Result<(), Box<dyn std::error::Error>> {
        let report = RawReport::zeroed(Transport::WirelessRadio, Direction::Output);
        assert_eq!(report.len(), 547);
        assert_eq!(report.payload_offset(), 2);
        assert!(report.as_bytes().iter().all(|&b| b == 0));

        assert!(RawReport::from_bytes(Transport::Wired, Direction::Input, &[0u8; 63]).is_none());
        let input = RawReport::from_bytes(Transport::Wired, Direction::Input, &[0u8; 64])
            .ok_or("64-byte wired input must be accepted")?;
        assert_eq!(input.payload_offset(), 1);
        Ok(())
    }

    #[test]
    fn test_transport_display() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(Transport::Wired.to_string(), "wired");
        assert_eq!(Transport::WirelessRadio.to_string(), "wireless-radio");
        Ok(())
    }
}
