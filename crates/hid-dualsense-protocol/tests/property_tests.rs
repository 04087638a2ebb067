//! Property-based tests for the DualSense codec.
//!
//! Covers:
//! - decoder totality over arbitrary buffers and offsets
//! - dpad classification for every nibble
//! - gyroscope smoothing step size and convergence
//! - output encoding determinism and transport equivalence
//! - checksum sensitivity over the covered prefix

use padlink_hid_dualsense_protocol::{
    BT_CRC_COVERED_LEN, BatteryDecodeMode, DPad, GyroSmoother, Lightbar, MicLed, OutputState,
    PlayerLedBrightness, PlayerLeds, Transport, TriggerEffect, Vec3, checksum,
    decode_input_report, encode_output_report,
};
use proptest::prelude::*;

fn trigger_effect() -> impl Strategy<Value = TriggerEffect> {
    prop_oneof![
        Just(TriggerEffect::NoResistance),
        (any::<u8>(), any::<u8>())
            .prop_map(|(start, force)| TriggerEffect::ContinuousResistance { start, force }),
        (any::<u8>(), any::<u8>())
            .prop_map(|(start, force)| TriggerEffect::SectionResistance { start, force }),
        (
            any::<u8>(),
            any::<bool>(),
            any::<u8>(),
            any::<u8>(),
            any::<u8>(),
            any::<u8>()
        )
            .prop_map(
                |(start, keep_beyond_range, begin_force, middle_force, end_force, frequency)| {
                    TriggerEffect::ExtendedEffect {
                        start,
                        keep_beyond_range,
                        begin_force,
                        middle_force,
                        end_force,
                        frequency,
                    }
                }
            ),
        Just(TriggerEffect::Calibrate),
    ]
}

fn mic_led() -> impl Strategy<Value = MicLed> {
    prop_oneof![Just(MicLed::Off), Just(MicLed::On), Just(MicLed::Pulse)]
}

fn brightness() -> impl Strategy<Value = PlayerLedBrightness> {
    prop_oneof![
        Just(PlayerLedBrightness::High),
        Just(PlayerLedBrightness::Medium),
        Just(PlayerLedBrightness::Low)
    ]
}

fn output_state() -> impl Strategy<Value = OutputState> {
    (
        (any::<u8>(), any::<u8>(), mic_led(), any::<bool>()),
        (any::<u8>(), any::<bool>(), brightness()),
        (any::<u8>(), any::<u8>(), any::<u8>()),
        (trigger_effect(), trigger_effect()),
    )
        .prop_map(
            |(
                (left_rumble, right_rumble, mic_led, disable_leds),
                (bitmask, fade, brightness),
                (r, g, b),
                (left_trigger_effect, right_trigger_effect),
            )| OutputState {
                left_rumble,
                right_rumble,
                mic_led,
                disable_leds,
                player_leds: PlayerLeds {
                    bitmask,
                    fade,
                    brightness,
                },
                lightbar: Lightbar::rgb(r, g, b),
                left_trigger_effect,
                right_trigger_effect,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Decoding never panics, whatever the buffer length or offset.
    #[test]
    fn prop_decode_is_total(
        buffer in proptest::collection::vec(any::<u8>(), 0..100),
        offset in 0usize..128,
        seed in (any::<i16>(), any::<i16>(), any::<i16>()),
    ) {
        let seed = Vec3::new(seed.0, seed.1, seed.2);
        let _ = decode_input_report(&buffer, offset, seed, BatteryDecodeMode::Literal);
        let _ = decode_input_report(&buffer, offset, seed, BatteryDecodeMode::Corrected);
    }

    /// Nibbles 0..=7 walk the compass clockwise from up, 8..=15 are released;
    /// the high nibble (face buttons) has no influence.
    #[test]
    fn prop_dpad_nibble_classification(nibble in 0u8..16, high in 0u8..16) {
        let dpad = DPad::from_nibble((high << 4) | nibble);
        prop_assert_eq!(dpad, DPad::from_nibble(nibble));
        prop_assert_eq!(dpad.is_released(), nibble >= 8);
        prop_assert!(!(dpad.up && dpad.down));
        prop_assert!(!(dpad.left && dpad.right));
        if nibble < 8 {
            // Eight compass points, clockwise from up.
            prop_assert_eq!(dpad.up, matches!(nibble, 7 | 0 | 1));
            prop_assert_eq!(dpad.right, matches!(nibble, 1..=3));
            prop_assert_eq!(dpad.down, matches!(nibble, 3..=5));
            prop_assert_eq!(dpad.left, matches!(nibble, 5..=7));
        }
    }

    /// One smoothing step covers a fifth of the remaining distance, give or
    /// take the truncation.
    #[test]
    fn prop_gyro_step_is_one_fifth(seed in any::<i16>(), raw in any::<i16>()) {
        let out = GyroSmoother::with_seed(Vec3::new(seed, 0, 0)).update(Vec3::new(raw, 0, 0)).x;
        let seed = i32::from(seed);
        let expected = seed + (i32::from(raw) - seed) / 5;
        prop_assert!((i32::from(out) - expected).abs() <= 1, "out={out} expected~{expected}");
    }

    /// A constant input drives the filter to within truncation distance.
    #[test]
    fn prop_gyro_converges(seed in any::<i16>(), raw in any::<i16>()) {
        let mut smoother = GyroSmoother::with_seed(Vec3::new(seed, seed, seed));
        for _ in 0..200 {
            smoother.update(Vec3::new(raw, raw, raw));
        }
        let gap = (i32::from(smoother.current().x) - i32::from(raw)).abs();
        prop_assert!(gap <= 5, "gap {gap} after 200 samples");
    }

    #[test]
    fn prop_encode_is_deterministic(state in output_state()) {
        for transport in [Transport::Wired, Transport::WirelessRadio] {
            let a = encode_output_report(&state, transport);
            let b = encode_output_report(&state, transport);
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
            prop_assert_eq!(a.len(), transport.output_report_len());
        }
    }

    /// The wired report is the Bluetooth payload with a one-byte header, and
    /// carries no checksum.
    #[test]
    fn prop_wired_payload_matches_bluetooth(state in output_state()) {
        let wired = encode_output_report(&state, Transport::Wired);
        let bt = encode_output_report(&state, Transport::WirelessRadio);
        let wired = wired.as_bytes();
        let bt = bt.as_bytes();
        prop_assert_eq!(wired.first().copied(), Some(0x02));
        prop_assert_eq!(bt.get(..2), Some(&[0x31u8, 0x02][..]));
        prop_assert_eq!(wired.get(1..), bt.get(2..49));
        prop_assert!(bt.get(78..).is_some_and(|tail| tail.iter().all(|&b| b == 0)));
    }

    /// The stored checksum matches the covered prefix and changes when any
    /// covered byte changes.
    #[test]
    fn prop_checksum_sensitive_to_every_covered_byte(
        state in output_state(),
        index in 0usize..BT_CRC_COVERED_LEN,
        flip in 1u8..=255,
    ) {
        let report = encode_output_report(&state, Transport::WirelessRadio);
        let bytes = report.as_bytes();
        let stored = bytes
            .get(74..78)
            .and_then(|field| <[u8; 4]>::try_from(field).ok())
            .map(u32::from_le_bytes);
        prop_assert_eq!(stored, Some(checksum(bytes, BT_CRC_COVERED_LEN)));

        let mut tampered = bytes.to_vec();
        if let Some(byte) = tampered.get_mut(index) {
            *byte ^= flip;
        }
        prop_assert_ne!(
            checksum(&tampered, BT_CRC_COVERED_LEN),
            checksum(bytes, BT_CRC_COVERED_LEN)
        );
    }

    /// Bytes outside the covered prefix do not affect the checksum.
    #[test]
    fn prop_checksum_ignores_tail(
        state in output_state(),
        index in BT_CRC_COVERED_LEN..547,
        flip in 1u8..=255,
    ) {
        let report = encode_output_report(&state, Transport::WirelessRadio);
        let mut tampered = report.as_bytes().to_vec();
        if let Some(byte) = tampered.get_mut(index) {
            *byte ^= flip;
        }
        prop_assert_eq!(
            checksum(&tampered, BT_CRC_COVERED_LEN),
            checksum(report.as_bytes(), BT_CRC_COVERED_LEN)
        );
    }

    /// Trigger blocks always start with the variant's opcode.
    #[test]
    fn prop_trigger_block_opcode(effect in trigger_effect()) {
        let block = effect.to_block();
        prop_assert_eq!(block.first().copied(), Some(effect.opcode()));
    }
}
