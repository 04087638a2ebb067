//! DualSense vendor/product IDs, report IDs and register maps.
//!
//! Input and output offsets are relative to the start of the report payload,
//! i.e. after the transport-specific header (see
//! [`Transport::input_offset`](crate::Transport::input_offset) and
//! [`Transport::output_offset`](crate::Transport::output_offset)).

#![deny(static_mut_refs)]

/// Sony Interactive Entertainment USB vendor ID.
pub const SONY_VENDOR_ID: u16 = 0x054C;

/// Known DualSense product IDs.
pub mod product_ids {
    /// DualSense wireless controller (CFI-ZCT1).
    pub const DUALSENSE: u16 = 0x0CE6;
}

/// Report IDs used on the wired and Bluetooth transports.
pub mod report_ids {
    /// Wired (USB) input report.
    pub const USB_INPUT: u8 = 0x01;
    /// Bluetooth full input report.
    pub const BT_INPUT: u8 = 0x31;
    /// Wired (USB) output report.
    pub const USB_OUTPUT: u8 = 0x02;
    /// Bluetooth output report.
    pub const BT_OUTPUT: u8 = 0x31;
    /// Sub-id following the Bluetooth output report ID.
    pub const BT_OUTPUT_TAG: u8 = 0x02;
    /// Calibration feature report. Reading it switches a Bluetooth-connected
    /// controller from the reduced report to the full 0x31 input report.
    pub const FEATURE_CALIBRATION: u8 = 0x05;
}

/// Length of the calibration feature report requested during the
/// Bluetooth handshake (report ID included).
pub const CALIBRATION_REPORT_LEN: usize = 41;

/// Byte offsets inside the input payload.
pub mod input_offsets {
    pub const LEFT_STICK_X: usize = 0x00;
    pub const LEFT_STICK_Y: usize = 0x01;
    pub const RIGHT_STICK_X: usize = 0x02;
    pub const RIGHT_STICK_Y: usize = 0x03;
    pub const LEFT_TRIGGER: usize = 0x04;
    pub const RIGHT_TRIGGER: usize = 0x05;
    /// High nibble: face buttons. Low nibble: dpad direction.
    pub const BUTTONS_FACE_DPAD: usize = 0x07;
    pub const BUTTONS_SHOULDER: usize = 0x08;
    pub const BUTTONS_SYSTEM: usize = 0x09;
    /// Three little-endian `i16` values.
    pub const ACCELEROMETER: usize = 0x0F;
    /// Three little-endian `i16` values.
    pub const GYROSCOPE: usize = 0x15;
    pub const TOUCH_POINT_1: usize = 0x20;
    pub const TOUCH_POINT_2: usize = 0x24;
    pub const RIGHT_TRIGGER_FEEDBACK: usize = 0x29;
    pub const LEFT_TRIGGER_FEEDBACK: usize = 0x2A;
    pub const STATUS_FLAGS: usize = 0x35;
    pub const BATTERY: usize = 0x36;
}

/// Single-bit masks for the button bytes.
pub mod button_masks {
    /// Masks for [`input_offsets::BUTTONS_FACE_DPAD`](super::input_offsets::BUTTONS_FACE_DPAD).
    pub mod face {
        pub const SQUARE: u8 = 0x10;
        pub const CROSS: u8 = 0x20;
        pub const CIRCLE: u8 = 0x40;
        pub const TRIANGLE: u8 = 0x80;
        pub const DPAD_NIBBLE: u8 = 0x0F;
    }

    /// Masks for [`input_offsets::BUTTONS_SHOULDER`](super::input_offsets::BUTTONS_SHOULDER).
    pub mod shoulder {
        pub const BUMPER_LEFT: u8 = 0x01;
        pub const BUMPER_RIGHT: u8 = 0x02;
        pub const TRIGGER_LEFT: u8 = 0x04;
        pub const TRIGGER_RIGHT: u8 = 0x08;
        pub const SELECT: u8 = 0x10;
        pub const MENU: u8 = 0x20;
        pub const STICK_LEFT: u8 = 0x40;
        pub const STICK_RIGHT: u8 = 0x80;
    }

    /// Masks for [`input_offsets::BUTTONS_SYSTEM`](super::input_offsets::BUTTONS_SYSTEM).
    pub mod system {
        pub const LOGO: u8 = 0x01;
        pub const TOUCHPAD: u8 = 0x02;
        pub const MIC: u8 = 0x04;
    }
}

/// Masks for the status and battery bytes.
pub mod status_masks {
    /// In [`input_offsets::STATUS_FLAGS`](super::input_offsets::STATUS_FLAGS).
    pub const HEADPHONE: u8 = 0x01;
    /// In [`input_offsets::STATUS_FLAGS`](super::input_offsets::STATUS_FLAGS).
    pub const CHARGING: u8 = 0x08;
    /// In [`input_offsets::BATTERY`](super::input_offsets::BATTERY).
    pub const FULLY_CHARGED: u8 = 0x20;
    /// In [`input_offsets::BATTERY`](super::input_offsets::BATTERY).
    pub const BATTERY_LEVEL: u8 = 0x0F;
}

/// Touch-point word layout (little-endian `u32`).
pub mod touch_layout {
    pub const Y_MASK: u32 = 0xFFF0_0000;
    pub const Y_SHIFT: u32 = 20;
    pub const X_MASK: u32 = 0x000F_FF00;
    pub const X_SHIFT: u32 = 8;
    /// Set while the finger is lifted.
    pub const UP_FLAG: u32 = 1 << 7;
    pub const ID_MASK: u32 = 0x7F;
}

/// Byte offsets inside the output payload.
pub mod output_offsets {
    pub const FEATURE_FLAGS_0: usize = 0x00;
    pub const FEATURE_FLAGS_1: usize = 0x01;
    pub const RUMBLE_RIGHT: usize = 0x02;
    pub const RUMBLE_LEFT: usize = 0x03;
    pub const MIC_LED: usize = 0x08;
    pub const RIGHT_TRIGGER: usize = 0x0A;
    pub const LEFT_TRIGGER: usize = 0x15;
    pub const LED_BRIGHTNESS_ENABLE: usize = 0x26;
    pub const LED_ENABLE: usize = 0x29;
    pub const PLAYER_LED_BRIGHTNESS: usize = 0x2A;
    pub const PLAYER_LEDS: usize = 0x2B;
    pub const LIGHTBAR_RED: usize = 0x2C;
    pub const LIGHTBAR_GREEN: usize = 0x2D;
    pub const LIGHTBAR_BLUE: usize = 0x2E;
}

/// Fixed values written by the encoder.
pub mod output_values {
    /// Enables every feature block in the report.
    pub const FEATURE_FLAGS_0: u8 = 0xFF;
    pub const FEATURE_FLAGS_1: u8 = 0xF7;
    pub const LED_BRIGHTNESS_ENABLE: u8 = 0x03;
    pub const LEDS_DISABLED: u8 = 0x01;
    pub const LEDS_ENABLED: u8 = 0x02;
    /// Set in the player LED byte when fading is disabled.
    pub const PLAYER_LED_NO_FADE: u8 = 0x20;
}

/// Player LED bitmask values (left to right).
pub mod player_leds {
    pub const LEFT: u8 = 0x01;
    pub const MIDDLE_LEFT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;
    pub const MIDDLE_RIGHT: u8 = 0x08;
    pub const RIGHT: u8 = 0x10;
    pub const ALL: u8 = 0x1F;

    pub const PLAYER_1: u8 = MIDDLE;
    pub const PLAYER_2: u8 = MIDDLE_LEFT | MIDDLE_RIGHT;
    pub const PLAYER_3: u8 = LEFT | MIDDLE | RIGHT;
    pub const PLAYER_4: u8 = LEFT | MIDDLE_LEFT | MIDDLE_RIGHT | RIGHT;
}

/// Adaptive-trigger opcodes written to byte 0 of a trigger block.
pub mod trigger_opcodes {
    pub const NO_RESISTANCE: u8 = 0x00;
    pub const CONTINUOUS_RESISTANCE: u8 = 0x01;
    pub const SECTION_RESISTANCE: u8 = 0x02;
    /// `0x02 | 0x20 | 0x04`.
    pub const EXTENDED: u8 = 0x02 | 0x20 | 0x04;
    pub const CALIBRATE: u8 = 0xFC;
    /// Written at the keep-flag sub-offset of an extended effect.
    pub const EXTENDED_KEEP: u8 = 0x02;
}
