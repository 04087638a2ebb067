//! DualSense input report decoding.
//!
//! Decoding is total: every field is read through a bounds-checked accessor
//! that yields zero past the end of the buffer, so a short or malformed
//! buffer produces a (mostly zeroed) state instead of a panic. Callers are
//! expected to hand in a buffer of the transport's input length.

#![deny(static_mut_refs)]

use crate::filter::GyroSmoother;
use crate::ids::{button_masks, input_offsets, status_masks, touch_layout};
use crate::types::{Transport, Vec3};

/// How the battery charging / fully-charged bits are interpreted.
///
/// The firmware semantics of these bits have not been confirmed against
/// hardware captures, so both readings are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BatteryDecodeMode {
    /// Compare the masked byte against the literal value `1`. With the
    /// multi-bit masks in use this is only true when the masked value is
    /// exactly `1`, i.e. never for the current masks.
    #[default]
    Literal,
    /// Treat any set bit under the mask as true.
    Corrected,
}

impl BatteryDecodeMode {
    fn test(self, byte: u8, mask: u8) -> bool {
        match self {
            Self::Literal => (byte & mask) == 1,
            Self::Corrected => (byte & mask) != 0,
        }
    }
}

/// Analog stick position, centered at zero. Positive Y points up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stick {
    pub x: i8,
    pub y: i8,
}

impl Stick {
    /// Decode from the raw unsigned axis bytes.
    pub fn from_raw(x: u8, y: u8) -> Self {
        Self {
            x: (i16::from(x) - 128) as i8,
            y: (-(i16::from(y) - 127)) as i8,
        }
    }

    /// Axis values scaled to roughly `[-1.0, 1.0]`.
    pub fn normalized(&self) -> (f32, f32) {
        (
            (f32::from(self.x) / 127.0).clamp(-1.0, 1.0),
            (f32::from(self.y) / 127.0).clamp(-1.0, 1.0),
        )
    }
}

/// Directional pad state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DPad {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DPad {
    pub const NONE: Self = Self::new(false, false, false, false);

    const fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    /// Nibble values 0..=7 walk clockwise from up; 8..=15 mean released.
    const TABLE: [Self; 8] = [
        Self::new(true, false, false, false), // 0: up
        Self::new(true, false, false, true),  // 1: up-right
        Self::new(false, false, false, true), // 2: right
        Self::new(false, true, false, true),  // 3: down-right
        Self::new(false, true, false, false), // 4: down
        Self::new(false, true, true, false),  // 5: down-left
        Self::new(false, false, true, false), // 6: left
        Self::new(true, false, true, false),  // 7: up-left
    ];

    /// Decode the low nibble of the face-button byte.
    pub fn from_nibble(nibble: u8) -> Self {
        Self::TABLE
            .get(usize::from(nibble & button_masks::face::DPAD_NIBBLE))
            .copied()
            .unwrap_or(Self::NONE)
    }

    pub fn is_released(&self) -> bool {
        *self == Self::NONE
    }
}

/// Digital buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buttons {
    pub square: bool,
    pub cross: bool,
    pub circle: bool,
    pub triangle: bool,
    pub bumper_left: bool,
    pub bumper_right: bool,
    pub trigger_left: bool,
    pub trigger_right: bool,
    pub select: bool,
    pub menu: bool,
    pub stick_left: bool,
    pub stick_right: bool,
    pub logo: bool,
    pub touchpad: bool,
    pub mic: bool,
}

impl Buttons {
    fn from_bytes(face: u8, shoulder: u8, system: u8) -> Self {
        use button_masks::{face as f, shoulder as s, system as sys};
        Self {
            square: face & f::SQUARE != 0,
            cross: face & f::CROSS != 0,
            circle: face & f::CIRCLE != 0,
            triangle: face & f::TRIANGLE != 0,
            bumper_left: shoulder & s::BUMPER_LEFT != 0,
            bumper_right: shoulder & s::BUMPER_RIGHT != 0,
            trigger_left: shoulder & s::TRIGGER_LEFT != 0,
            trigger_right: shoulder & s::TRIGGER_RIGHT != 0,
            select: shoulder & s::SELECT != 0,
            menu: shoulder & s::MENU != 0,
            stick_left: shoulder & s::STICK_LEFT != 0,
            stick_right: shoulder & s::STICK_RIGHT != 0,
            logo: system & sys::LOGO != 0,
            touchpad: system & sys::TOUCHPAD != 0,
            mic: system & sys::MIC != 0,
        }
    }
}

/// One touchpad contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchPoint {
    /// 12-bit horizontal position.
    pub x: u16,
    /// 12-bit vertical position.
    pub y: u16,
    pub is_down: bool,
    /// 7-bit contact id, incremented per new touch.
    pub id: u8,
}

impl TouchPoint {
    /// Unpack a little-endian touch word. The firmware sets bit 7 while the
    /// finger is *up*, so a clear bit means down.
    pub fn from_raw(raw: u32) -> Self {
        Self {
            y: ((raw & touch_layout::Y_MASK) >> touch_layout::Y_SHIFT) as u16,
            x: ((raw & touch_layout::X_MASK) >> touch_layout::X_SHIFT) as u16,
            is_down: raw & touch_layout::UP_FLAG == 0,
            id: (raw & touch_layout::ID_MASK) as u8,
        }
    }
}

/// Battery status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battery {
    pub charging: bool,
    pub fully_charged: bool,
    /// 4-bit level, 0..=10 in practice.
    pub level: u8,
}

impl Battery {
    pub fn percentage(&self) -> u8 {
        self.level.min(10) * 10
    }
}

/// Snapshot of everything a single input report carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputState {
    pub left_stick: Stick,
    pub right_stick: Stick,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub buttons: Buttons,
    pub dpad: DPad,
    pub accelerometer: Vec3,
    pub gyroscope: Vec3,
    /// Exponentially smoothed gyroscope, see [`GyroSmoother`].
    pub gyroscope_filtered: Vec3,
    pub touch_points: [TouchPoint; 2],
    pub battery: Battery,
    pub headphone_connected: bool,
    pub left_trigger_feedback: u8,
    pub right_trigger_feedback: u8,
}

/// Stateful decoder owning the gyroscope filter between reports.
#[derive(Debug, Clone, Default)]
pub struct InputDecoder {
    battery_mode: BatteryDecodeMode,
    gyro: GyroSmoother,
}

impl InputDecoder {
    pub fn new(battery_mode: BatteryDecodeMode) -> Self {
        Self {
            battery_mode,
            gyro: GyroSmoother::new(),
        }
    }

    pub fn battery_mode(&self) -> BatteryDecodeMode {
        self.battery_mode
    }

    /// Decode a full report received over `transport`.
    pub fn decode(&mut self, report: &[u8], transport: Transport) -> InputState {
        self.decode_at(report, transport.input_offset())
    }

    /// Decode with an explicit payload offset.
    pub fn decode_at(&mut self, buffer: &[u8], offset: usize) -> InputState {
        let state = decode_input_report(buffer, offset, self.gyro.current(), self.battery_mode);
        self.gyro = GyroSmoother::with_seed(state.gyroscope_filtered);
        state
    }

    /// Forget the filter history, e.g. after a reconnect.
    pub fn reset(&mut self) {
        self.gyro.reset();
    }
}

/// Decode the payload starting at `offset`.
///
/// `gyro_seed` is the filtered gyroscope value of the previous report; the
/// returned state carries the updated value.
pub fn decode_input_report(
    buffer: &[u8],
    offset: usize,
    gyro_seed: Vec3,
    battery_mode: BatteryDecodeMode,
) -> InputState {
    let p = Payload { buffer, offset };

    let face = p.u8(input_offsets::BUTTONS_FACE_DPAD);
    let shoulder = p.u8(input_offsets::BUTTONS_SHOULDER);
    let system = p.u8(input_offsets::BUTTONS_SYSTEM);

    let gyroscope = p.vec3(input_offsets::GYROSCOPE);
    let gyroscope_filtered = GyroSmoother::with_seed(gyro_seed).update(gyroscope);

    let status = p.u8(input_offsets::STATUS_FLAGS);
    let battery = p.u8(input_offsets::BATTERY);

    InputState {
        left_stick: Stick::from_raw(
            p.u8(input_offsets::LEFT_STICK_X),
            p.u8(input_offsets::LEFT_STICK_Y),
        ),
        right_stick: Stick::from_raw(
            p.u8(input_offsets::RIGHT_STICK_X),
            p.u8(input_offsets::RIGHT_STICK_Y),
        ),
        left_trigger: p.u8(input_offsets::LEFT_TRIGGER),
        right_trigger: p.u8(input_offsets::RIGHT_TRIGGER),
        buttons: Buttons::from_bytes(face, shoulder, system),
        dpad: DPad::from_nibble(face),
        accelerometer: p.vec3(input_offsets::ACCELEROMETER),
        gyroscope,
        gyroscope_filtered,
        touch_points: [
            TouchPoint::from_raw(p.u32_le(input_offsets::TOUCH_POINT_1)),
            TouchPoint::from_raw(p.u32_le(input_offsets::TOUCH_POINT_2)),
        ],
        battery: Battery {
            charging: battery_mode.test(status, status_masks::CHARGING),
            fully_charged: battery_mode.test(battery, status_masks::FULLY_CHARGED),
            level: battery & status_masks::BATTERY_LEVEL,
        },
        headphone_connected: status & status_masks::HEADPHONE != 0,
        left_trigger_feedback: p.u8(input_offsets::LEFT_TRIGGER_FEEDBACK),
        right_trigger_feedback: p.u8(input_offsets::RIGHT_TRIGGER_FEEDBACK),
    }
}

/// Check length and report ID of a report received over `transport`.
pub fn validate_input_report(report: &[u8], transport: Transport) -> bool {
    if report.len() < transport.input_report_len() {
        tracing::trace!(
            len = report.len(),
            expected = transport.input_report_len(),
            "input report too short"
        );
        return false;
    }
    report.first().copied() == Some(transport.input_report_id())
}

/// Bounds-checked view over the payload portion of a report.
struct Payload<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl Payload<'_> {
    fn u8(&self, at: usize) -> u8 {
        self.buffer
            .get(self.offset.saturating_add(at))
            .copied()
            .unwrap_or(0)
    }

    fn i16_le(&self, at: usize) -> i16 {
        i16::from_le_bytes([self.u8(at), self.u8(at + 1)])
    }

    fn u32_le(&self, at: usize) -> u32 {
        u32::from_le_bytes([
            self.u8(at),
            self.u8(at + 1),
            self.u8(at + 2),
            self.u8(at + 3),
        ])
    }

    fn vec3(&self, at: usize) -> Vec3 {
        Vec3::new(self.i16_le(at), self.i16_le(at + 2), self.i16_le(at + 4))
    }
}
