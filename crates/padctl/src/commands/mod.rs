//! Command implementations for padctl

pub mod codec;
pub mod device;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use padlink_connection::ConnectionConfig;
use padlink_hid_dualsense_protocol::{OutputState, Transport};

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    /// USB cable (64-byte input, 48-byte output reports)
    Wired,
    /// Bluetooth (78-byte input, 547-byte output reports)
    #[value(alias = "bluetooth")]
    Wireless,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Wired => Transport::Wired,
            TransportArg::Wireless => Transport::WirelessRadio,
        }
    }
}

/// Load and validate the connection configuration, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConnectionConfig> {
    let Some(path) = path else {
        return Ok(ConnectionConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .map_err(CliError::IoError)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ConnectionConfig = serde_json::from_str(&text)
        .map_err(|e| CliError::InvalidConfiguration(e.to_string()))
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;

    tracing::debug!(path = %path.display(), "Loaded connection config");
    Ok(config)
}

/// Load an output state from a JSON file. Missing fields take their defaults.
pub fn load_output_state(path: &Path) -> Result<OutputState> {
    let text = std::fs::read_to_string(path)
        .map_err(CliError::IoError)
        .with_context(|| format!("Failed to read output state {}", path.display()))?;
    let state = serde_json::from_str(&text)
        .map_err(|e| CliError::InvalidInput(e.to_string()))
        .with_context(|| format!("Failed to parse output state {}", path.display()))?;
    Ok(state)
}
