//! Bluetooth output report checksum.
//!
//! The controller validates Bluetooth output reports with CRC-32/ISO-HDLC
//! (reflected polynomial `0xEDB88320`, init and final XOR `0xFFFFFFFF`)
//! computed over a one-byte transport seed followed by the report prefix.
//! The seed `0xA2` is the Bluetooth HID "DATA | OUTPUT" transaction header,
//! which the host stack strips before the report reaches the application.

#![deny(static_mut_refs)]

/// Transaction header byte folded into the checksum ahead of the report.
pub const BT_CRC_SEED: u8 = 0xA2;

/// Number of report bytes covered by the checksum.
pub const BT_CRC_COVERED_LEN: usize = 74;

/// Offset of the little-endian checksum field; directly follows the covered range.
pub const BT_CRC_OFFSET: usize = BT_CRC_COVERED_LEN;

/// Compute the checksum over `buffer[..length]`.
///
/// `length` is clamped to the buffer length.
pub fn checksum(buffer: &[u8], length: usize) -> u32 {
    let covered = buffer.get(..length).unwrap_or(buffer);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[BT_CRC_SEED]);
    hasher.update(covered);
    hasher.finalize()
}

/// Compute the checksum over the first [`BT_CRC_COVERED_LEN`] bytes and store
/// it little-endian right after them.
///
/// Returns the checksum, or `None` if `report` is too short to hold the field.
pub fn append_checksum(report: &mut [u8]) -> Option<u32> {
    let crc = checksum(report, BT_CRC_COVERED_LEN);
    let field = report.get_mut(BT_CRC_OFFSET..BT_CRC_OFFSET + 4)?;
    field.copy_from_slice(&crc.to_le_bytes());
    Some(crc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_matches_seeded_crc32() -> Result<(), Box<dyn std::error::Error>> {
        let data = [0x31u8, 0x02, 0xFF, 0xF7, 0x10, 0x20];
        let mut seeded = vec![BT_CRC_SEED];
        seeded.extend_from_slice(&data);
        assert_eq!(checksum(&data, data.len()), crc32fast::hash(&seeded));
        Ok(())
    }

    #[test]
    fn test_checksum_of_zero_prefix_golden() -> Result<(), Box<dyn std::error::Error>> {
        let data = [0u8; BT_CRC_COVERED_LEN];
        assert_eq!(checksum(&data, BT_CRC_COVERED_LEN), 0x0EAA_90A9);
        Ok(())
    }

    #[test]
    fn test_checksum_ignores_bytes_past_length() -> Result<(), Box<dyn std::error::Error>> {
        let mut data = [0u8; 80];
        let before = checksum(&data, BT_CRC_COVERED_LEN);
        data[BT_CRC_COVERED_LEN] = 0xAB;
        data[79] = 0xCD;
        assert_eq!(checksum(&data, BT_CRC_COVERED_LEN), before);
        Ok(())
    }

    #[test]
    fn test_checksum_length_clamped() -> Result<(), Box<dyn std::error::Error>> {
        let data = [1u8, 2, 3];
        assert_eq!(checksum(&data, 100), checksum(&data, 3));
        Ok(())
    }

    #[test]
    fn test_append_checksum_writes_le_field() -> Result<(), Box<dyn std::error::Error>> {
        let mut report = [0u8; 78];
        let crc = append_checksum(&mut report).ok_or("report long enough")?;
        assert_eq!(crc, 0x0EAA_90A9);
        assert_eq!(&report[74..78], &[0xA9, 0x90, 0xAA, 0x0E]);
        Ok(())
    }

    #[test]
    fn test_append_checksum_short_buffer() -> Result<(), Box<dyn std::error::Error>> {
        let mut report = [0u8; 76];
        assert!(append_checksum(&mut report).is_none());
        Ok(())
    }
}
