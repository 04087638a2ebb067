//! Error types for padctl

use padlink_hid_common::HidError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Transport error: {0}")]
    Transport(#[from] HidError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceNotFound(_) => 2,
            Self::InvalidInput(_) | Self::InvalidConfiguration(_) => 4,
            Self::Transport(HidError::TransportUnavailable { .. }) => 2,
            Self::Transport(HidError::InvalidArgument(_)) => 4,
            Self::Transport(_) => 5,
            Self::IoError(_) | Self::JsonError(_) => 1,
        }
    }
}
