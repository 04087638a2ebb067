//! DualSense output report encoding.
//!
//! All functions are pure. The same [`OutputState`] always encodes to the
//! same bytes for a given transport.
//!
//! # Layout
//!
//! ```text
//! Wired (48 bytes)            Bluetooth (547 bytes)
//! [0]    0x02 report id       [0]    0x31 report id
//! [1..]  payload              [1]    0x02 sub-id
//!                             [2..]  payload
//!                             [74..78] CRC-32 of [0..74), little-endian
//! ```
//!
//! Payload offsets are listed in [`ids::output_offsets`](crate::ids::output_offsets).

#![deny(static_mut_refs)]

use crate::crc;
use crate::ids::{output_offsets, output_values, player_leds, report_ids};
use crate::trigger::{TRIGGER_BLOCK_LEN, TriggerEffect};
use crate::types::{Direction, RawReport, Transport};

/// Microphone LED mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MicLed {
    #[default]
    Off,
    On,
    Pulse,
}

impl MicLed {
    pub fn wire_value(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::On => 0x01,
            Self::Pulse => 0x02,
        }
    }
}

/// Player LED brightness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlayerLedBrightness {
    #[default]
    High,
    Medium,
    Low,
}

impl PlayerLedBrightness {
    pub fn wire_value(self) -> u8 {
        match self {
            Self::High => 0x00,
            Self::Medium => 0x01,
            Self::Low => 0x02,
        }
    }
}

/// Row of five player indicator LEDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerLeds {
    /// Bitmask of lit LEDs, see [`ids::player_leds`](crate::ids::player_leds).
    /// Only the low five bits are used.
    pub bitmask: u8,
    /// Fade in when the LEDs change.
    pub fade: bool,
    pub brightness: PlayerLedBrightness,
}

impl PlayerLeds {
    /// Wire byte: five LED bits plus the inverted fade bit.
    pub fn wire_value(&self) -> u8 {
        let leds = self.bitmask & player_leds::ALL;
        if self.fade {
            leds & !output_values::PLAYER_LED_NO_FADE
        } else {
            leds | output_values::PLAYER_LED_NO_FADE
        }
    }
}

/// Lightbar color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lightbar {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Lightbar {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Everything the host can drive on the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutputState {
    pub left_rumble: u8,
    pub right_rumble: u8,
    pub mic_led: MicLed,
    /// Turn off every LED, including the lightbar.
    pub disable_leds: bool,
    pub player_leds: PlayerLeds,
    pub lightbar: Lightbar,
    pub left_trigger_effect: TriggerEffect,
    pub right_trigger_effect: TriggerEffect,
}

/// Encode `state` into a freshly allocated report for `transport`.
pub fn encode_output_report(state: &OutputState, transport: Transport) -> RawReport {
    let mut report = RawReport::zeroed(transport, Direction::Output);
    // The buffer is allocated at exactly the required length.
    let _written = encode_into(state, transport, report.as_mut_bytes());
    report
}

/// Encode `state` into the first `transport.output_report_len()` bytes of
/// `out`, overwriting whatever they held. Bytes past the report are left
/// untouched.
///
/// Returns the number of bytes making up the report, or `0` if `out` is too
/// short (nothing is written in that case).
pub fn encode_into(state: &OutputState, transport: Transport, out: &mut [u8]) -> usize {
    let len = transport.output_report_len();
    let Some(report) = out.get_mut(..len) else {
        tracing::trace!(len = out.len(), expected = len, "output buffer too short");
        return 0;
    };
    report.fill(0);

    put(report, 0, transport.output_report_id());
    if transport == Transport::WirelessRadio {
        put(report, 1, report_ids::BT_OUTPUT_TAG);
    }

    if let Some(payload) = report.get_mut(transport.output_offset()..) {
        write_payload(state, payload);
    }

    if transport == Transport::WirelessRadio {
        // Covered range and field always fit in a 547-byte report.
        let _crc = crc::append_checksum(report);
    }

    len
}

fn write_payload(state: &OutputState, payload: &mut [u8]) {
    use output_offsets as off;

    put(payload, off::FEATURE_FLAGS_0, output_values::FEATURE_FLAGS_0);
    put(payload, off::FEATURE_FLAGS_1, output_values::FEATURE_FLAGS_1);

    put(payload, off::RUMBLE_RIGHT, state.right_rumble);
    put(payload, off::RUMBLE_LEFT, state.left_rumble);

    put(payload, off::MIC_LED, state.mic_led.wire_value());

    put(payload, off::PLAYER_LEDS, state.player_leds.wire_value());
    put(
        payload,
        off::LED_BRIGHTNESS_ENABLE,
        output_values::LED_BRIGHTNESS_ENABLE,
    );
    put(
        payload,
        off::LED_ENABLE,
        if state.disable_leds {
            output_values::LEDS_DISABLED
        } else {
            output_values::LEDS_ENABLED
        },
    );
    put(
        payload,
        off::PLAYER_LED_BRIGHTNESS,
        state.player_leds.brightness.wire_value(),
    );

    put(payload, off::LIGHTBAR_RED, state.lightbar.r);
    put(payload, off::LIGHTBAR_GREEN, state.lightbar.g);
    put(payload, off::LIGHTBAR_BLUE, state.lightbar.b);

    encode_trigger(&state.right_trigger_effect, payload, off::RIGHT_TRIGGER);
    encode_trigger(&state.left_trigger_effect, payload, off::LEFT_TRIGGER);
}

fn encode_trigger(effect: &TriggerEffect, payload: &mut [u8], base: usize) {
    if let Some(block) = payload.get_mut(base..base + TRIGGER_BLOCK_LEN) {
        effect.encode_into(block);
    }
}

fn put(buf: &mut [u8], at: usize, value: u8) {
    if let Some(slot) = buf.get_mut(at) {
        *slot = value;
    }
}
