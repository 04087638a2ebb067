//! DualSense HID protocol: input report decoding, output report encoding,
//! adaptive-trigger effects and the Bluetooth output checksum.
//!
//! This crate is intentionally I/O-free. It provides pure functions and
//! types that can be tested without hardware; the only state it carries is
//! the gyroscope smoothing filter owned by [`InputDecoder`].

#![deny(static_mut_refs)]

pub mod crc;
pub mod filter;
pub mod ids;
pub mod input;
pub mod output;
pub mod trigger;
pub mod types;

pub use crc::{BT_CRC_COVERED_LEN, BT_CRC_SEED, checksum};
pub use filter::{GYRO_SMOOTHING_FACTOR, GyroSmoother};
pub use ids::{SONY_VENDOR_ID, product_ids};
pub use input::{
    Battery, BatteryDecodeMode, Buttons, DPad, InputDecoder, InputState, Stick, TouchPoint,
    decode_input_report, validate_input_report,
};
pub use output::{
    Lightbar, MicLed, OutputState, PlayerLedBrightness, PlayerLeds, encode_into,
    encode_output_report,
};
pub use trigger::{TRIGGER_BLOCK_LEN, TriggerEffect};
pub use types::{Direction, RawReport, Transport, Vec3};
