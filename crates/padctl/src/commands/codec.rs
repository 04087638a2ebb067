//! Offline report decoding and encoding

use std::path::Path;

use anyhow::Result;
use padlink_hid_dualsense_protocol::{
    BatteryDecodeMode, InputDecoder, OutputState, Transport, encode_output_report,
    validate_input_report,
};
use tracing::debug;

use crate::commands::load_output_state;
use crate::error::CliError;
use crate::output;

/// Decode one captured input report.
pub fn decode(
    hex: &[String],
    transport: Transport,
    battery_mode: BatteryDecodeMode,
    json: bool,
) -> Result<()> {
    let report = output::parse_hex_bytes(hex)?;
    if !validate_input_report(&report, transport) {
        return Err(CliError::InvalidInput(format!(
            "expected a {}-byte {} input report starting with 0x{:02X}, got {} bytes starting with 0x{:02X}",
            transport.input_report_len(),
            output::transport_label(transport),
            transport.input_report_id(),
            report.len(),
            report.first().copied().unwrap_or_default(),
        ))
        .into());
    }

    let state = InputDecoder::new(battery_mode).decode(&report, transport);
    debug!(%transport, len = report.len(), "Decoded input report");
    output::print_input_state(&state, transport, json);
    Ok(())
}

/// Encode an output state, read from `state_path` or the default, and print
/// the wire bytes.
pub fn encode(state_path: Option<&Path>, transport: Transport, json: bool) -> Result<()> {
    let state = match state_path {
        Some(path) => load_output_state(path)?,
        None => OutputState::default(),
    };
    let report = encode_output_report(&state, transport);
    debug!(%transport, len = report.len(), "Encoded output report");
    output::print_report(&report, json);
    Ok(())
}
