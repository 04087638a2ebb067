//! Adaptive-trigger effect encoding.
//!
//! Each trigger owns an 11-byte block in the output payload. Byte 0 is the
//! effect opcode; the meaning of the remaining bytes depends on it:
//!
//! | Effect                | Opcode | Parameters                                               |
//! |-----------------------|--------|----------------------------------------------------------|
//! | No resistance         | `0x00` | +1, +2 zeroed                                            |
//! | Continuous resistance | `0x01` | +1 start, +2 force                                       |
//! | Section resistance    | `0x02` | +1 start, +2 force                                       |
//! | Extended              | `0x26` | +1 `0xFF - start`, +2 keep flag, +4..+6 forces, +9 freq  |
//! | Calibrate             | `0xFC` | none                                                     |
//!
//! Positions are raw trigger travel (0 = released, 255 = fully pulled).
//! Where a variant carries both a start and an end position the caller must
//! keep `end >= start`; the type does not enforce it.

#![deny(static_mut_refs)]

use crate::ids::trigger_opcodes;

/// Bytes reserved for one trigger's effect block.
pub const TRIGGER_BLOCK_LEN: usize = 11;

/// Sub-offsets inside a trigger block.
mod block {
    pub const OPCODE: usize = 0;
    pub const PARAM_0: usize = 1;
    pub const PARAM_1: usize = 2;
    pub const BEGIN_FORCE: usize = 4;
    pub const MIDDLE_FORCE: usize = 5;
    pub const END_FORCE: usize = 6;
    pub const FREQUENCY: usize = 9;
}

/// Firmware-side resistance program for one trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum TriggerEffect {
    /// Trigger moves freely.
    #[default]
    NoResistance,
    /// Constant resistance from `start` to the end of travel.
    ContinuousResistance { start: u8, force: u8 },
    /// Resistance within a section of travel beginning at `start`.
    SectionResistance { start: u8, force: u8 },
    /// Vibrating resistance with a force ramp over the pull.
    ExtendedEffect {
        start: u8,
        /// Keep playing once the trigger is pulled past the effect range.
        keep_beyond_range: bool,
        begin_force: u8,
        middle_force: u8,
        end_force: u8,
        /// Vibration frequency in Hz; halved on the wire, minimum 1.
        frequency: u8,
    },
    /// Run the trigger motor calibration routine.
    Calibrate,
}

impl TriggerEffect {
    /// Opcode written to byte 0 of the block.
    pub fn opcode(&self) -> u8 {
        match self {
            Self::NoResistance => trigger_opcodes::NO_RESISTANCE,
            Self::ContinuousResistance { .. } => trigger_opcodes::CONTINUOUS_RESISTANCE,
            Self::SectionResistance { .. } => trigger_opcodes::SECTION_RESISTANCE,
            Self::ExtendedEffect { .. } => trigger_opcodes::EXTENDED,
            Self::Calibrate => trigger_opcodes::CALIBRATE,
        }
    }

    /// Write this effect into `block`, which starts at the trigger's base
    /// offset. Bytes not owned by the variant are left untouched, so callers
    /// start from a zeroed report. Writes past the end of `block` are dropped.
    pub fn encode_into(&self, block: &mut [u8]) {
        put(block, block::OPCODE, self.opcode());
        match *self {
            Self::NoResistance => {
                put(block, block::PARAM_0, 0);
                put(block, block::PARAM_1, 0);
            }
            Self::ContinuousResistance { start, force }
            | Self::SectionResistance { start, force } => {
                put(block, block::PARAM_0, start);
                put(block, block::PARAM_1, force);
            }
            Self::ExtendedEffect {
                start,
                keep_beyond_range,
                begin_force,
                middle_force,
                end_force,
                frequency,
            } => {
                put(block, block::PARAM_0, 0xFF - start);
                if keep_beyond_range {
                    put(block, block::PARAM_1, trigger_opcodes::EXTENDED_KEEP);
                }
                put(block, block::BEGIN_FORCE, begin_force);
                put(block, block::MIDDLE_FORCE, middle_force);
                put(block, block::END_FORCE, end_force);
                put(block, block::FREQUENCY, (frequency / 2).max(1));
            }
            Self::Calibrate => {}
        }
    }

    /// Encode into a fresh zeroed block.
    pub fn to_block(&self) -> [u8; TRIGGER_BLOCK_LEN] {
        let mut block = [0u8; TRIGGER_BLOCK_LEN];
        self.encode_into(&mut block);
        block
    }
}

fn put(buf: &mut [u8], at: usize, value: u8) {
    if let Some(slot) = buf.get_mut(at) {
        *slot = value;
    }
}
