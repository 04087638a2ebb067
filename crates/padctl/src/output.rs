//! Output formatting and argument parsing helpers

use anyhow::Error;
use colored::*;
use padlink_connection::ConnectionEvent;
use padlink_hid_common::DeviceCandidate;
use padlink_hid_dualsense_protocol::{Buttons, InputState, RawReport, Transport};
use serde::Serialize;
use serde_json::json;

use crate::error::CliError;

/// Bytes per row in hex dumps.
const HEX_ROW: usize = 16;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "chain": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        }
    });
    print_json(&error_json);
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// Parse captured report bytes.
///
/// Accepts separate tokens (`01 ff 7f`), one run of digits (`01ff7f`) or any
/// mix, with optional `0x` prefixes and `:`/`,` separators.
pub fn parse_hex_bytes<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u8>, CliError> {
    let mut bytes = Vec::new();
    for token in tokens {
        for part in token
            .as_ref()
            .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
            .filter(|p| !p.is_empty())
        {
            let digits = part
                .strip_prefix("0x")
                .or_else(|| part.strip_prefix("0X"))
                .unwrap_or(part);
            if digits.is_empty() || digits.len() % 2 != 0 {
                return Err(CliError::InvalidInput(format!(
                    "'{part}' is not a whole number of hex bytes"
                )));
            }
            for pair in digits.as_bytes().chunks(2) {
                let pair = std::str::from_utf8(pair)
                    .map_err(|e| CliError::InvalidInput(format!("'{part}': {e}")))?;
                let byte = u8::from_str_radix(pair, 16)
                    .map_err(|e| CliError::InvalidInput(format!("'{part}': {e}")))?;
                bytes.push(byte);
            }
        }
    }
    if bytes.is_empty() {
        return Err(CliError::InvalidInput("no report bytes given".to_string()));
    }
    Ok(bytes)
}

/// Uppercase, space separated.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn transport_label(transport: Transport) -> &'static str {
    match transport {
        Transport::Wired => "USB",
        Transport::WirelessRadio => "Bluetooth",
    }
}

pub fn print_candidates(candidates: &[(DeviceCandidate, Option<Transport>)], json: bool) {
    if json {
        let devices: Vec<_> = candidates
            .iter()
            .map(|(candidate, transport)| {
                json!({
                    "path": candidate.path,
                    "vendor_id": format!("0x{:04X}", candidate.vendor_id),
                    "product_id": format!("0x{:04X}", candidate.product_id),
                    "name": candidate.display_name(),
                    "serial_number": candidate.serial_number,
                    "input_report_len": candidate.input_report_len,
                    "transport": transport,
                })
            })
            .collect();
        print_json(&json!({ "success": true, "devices": devices }));
        return;
    }

    if candidates.is_empty() {
        println!("{}", "No controllers found".yellow());
        return;
    }

    println!("{}", "Controllers:".bold());
    for (candidate, transport) in candidates {
        let transport = match transport {
            Some(t) => transport_label(*t).green(),
            None => format!("unsupported ({} byte reports)", candidate.input_report_len).red(),
        };
        println!(
            "  {} {:04X}:{:04X} {} [{}]",
            "●".green(),
            candidate.vendor_id,
            candidate.product_id,
            candidate.display_name().bold(),
            transport
        );
        println!("      {}", candidate.path.dimmed());
    }
}

fn pressed_buttons(buttons: &Buttons) -> Vec<&'static str> {
    [
        (buttons.square, "square"),
        (buttons.cross, "cross"),
        (buttons.circle, "circle"),
        (buttons.triangle, "triangle"),
        (buttons.bumper_left, "L1"),
        (buttons.bumper_right, "R1"),
        (buttons.trigger_left, "L2"),
        (buttons.trigger_right, "R2"),
        (buttons.select, "create"),
        (buttons.menu, "options"),
        (buttons.stick_left, "L3"),
        (buttons.stick_right, "R3"),
        (buttons.logo, "ps"),
        (buttons.touchpad, "touchpad"),
        (buttons.mic, "mic"),
    ]
    .into_iter()
    .filter_map(|(down, name)| down.then_some(name))
    .collect()
}

fn dpad_label(state: &InputState) -> String {
    let d = state.dpad;
    let mut label = String::new();
    for (down, c) in [(d.up, 'U'), (d.down, 'D'), (d.left, 'L'), (d.right, 'R')] {
        if down {
            label.push(c);
        }
    }
    if label.is_empty() {
        label.push('-');
    }
    label
}

/// One-line summary of a decoded input state.
pub fn input_summary(state: &InputState) -> String {
    let buttons = pressed_buttons(&state.buttons);
    let mut line = format!(
        "L=({:4},{:4}) R=({:4},{:4}) L2={:3} R2={:3} dpad={} buttons=[{}] battery={}%",
        state.left_stick.x,
        state.left_stick.y,
        state.right_stick.x,
        state.right_stick.y,
        state.left_trigger,
        state.right_trigger,
        dpad_label(state),
        buttons.join(","),
        state.battery.percentage(),
    );
    if state.battery.charging {
        line.push_str(" charging");
    }
    if state.headphone_connected {
        line.push_str(" headphones");
    }
    line
}

/// Multi-line view used by `decode`.
pub fn print_input_state(state: &InputState, transport: Transport, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "transport": transport,
            "state": state,
        }));
        return;
    }

    println!(
        "{} {}",
        "Decoded".bold(),
        format!("{} input report", transport_label(transport)).dimmed()
    );
    println!("  {}", input_summary(state));
    println!(
        "  accel=({}, {}, {}) gyro=({}, {}, {}) filtered=({}, {}, {})",
        state.accelerometer.x,
        state.accelerometer.y,
        state.accelerometer.z,
        state.gyroscope.x,
        state.gyroscope.y,
        state.gyroscope.z,
        state.gyroscope_filtered.x,
        state.gyroscope_filtered.y,
        state.gyroscope_filtered.z,
    );
    for (i, touch) in state.touch_points.iter().enumerate() {
        if touch.is_down {
            println!("  touch[{i}] id={} at ({}, {})", touch.id, touch.x, touch.y);
        }
    }
}

pub fn print_report(report: &RawReport, json: bool) {
    let bytes = report.as_bytes();
    if json {
        print_json(&json!({
            "success": true,
            "transport": report.transport(),
            "length": bytes.len(),
            "bytes": format_hex(bytes),
        }));
        return;
    }

    println!(
        "{} {}",
        format!("{} output report", transport_label(report.transport())).bold(),
        format!("({} bytes)", bytes.len()).dimmed()
    );
    for (row, chunk) in bytes.chunks(HEX_ROW).enumerate() {
        println!("{:04X}  {}", row * HEX_ROW, format_hex(chunk));
    }
}

/// Print one event from the monitor stream. JSON mode emits one object per line.
pub fn print_event(event: &ConnectionEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format event as JSON: {e}"),
        }
        return;
    }

    match event {
        ConnectionEvent::StatusChanged {
            connected: true,
            transport,
        } => println!(
            "{} over {}",
            "Connected".green().bold(),
            transport_label(*transport)
        ),
        ConnectionEvent::StatusChanged {
            connected: false,
            transport,
        } => println!(
            "{} ({})",
            "Disconnected".red().bold(),
            transport_label(*transport)
        ),
        ConnectionEvent::InputChanged { state } => println!("{}", input_summary(state)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padlink_hid_dualsense_protocol::{Battery, DPad, Stick};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_parse_hex_bytes_forms() -> TestResult {
        assert_eq!(parse_hex_bytes(&["01", "ff", "0x7F"])?, vec![0x01, 0xFF, 0x7F]);
        assert_eq!(parse_hex_bytes(&["01ff7f"])?, vec![0x01, 0xFF, 0x7F]);
        assert_eq!(parse_hex_bytes(&["01:ff, 7f"])?, vec![0x01, 0xFF, 0x7F]);
        Ok(())
    }

    #[test]
    fn test_parse_hex_bytes_rejects_bad_input() {
        assert!(matches!(
            parse_hex_bytes(&["1"]),
            Err(CliError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_hex_bytes(&["zz"]),
            Err(CliError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_hex_bytes::<&str>(&[]),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x02, 0xFF, 0x0A]), "02 FF 0A");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn test_input_summary() {
        let mut state = InputState {
            left_stick: Stick { x: 127, y: -3 },
            right_trigger: 200,
            dpad: DPad {
                up: true,
                right: true,
                ..DPad::NONE
            },
            battery: Battery {
                charging: true,
                fully_charged: false,
                level: 7,
            },
            ..InputState::default()
        };
        state.buttons.cross = true;
        state.buttons.bumper_right = true;

        insta::assert_snapshot!(
            input_summary(&state),
            @"L=( 127,  -3) R=(   0,   0) L2=  0 R2=200 dpad=UR buttons=[cross,R1] battery=70% charging"
        );
    }

    #[test]
    fn test_input_summary_released() {
        insta::assert_snapshot!(
            input_summary(&InputState::default()),
            @"L=(   0,   0) R=(   0,   0) L2=  0 R2=  0 dpad=- buttons=[] battery=0%"
        );
    }
}
