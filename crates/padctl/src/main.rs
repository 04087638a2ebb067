//! padctl - DualSense controller CLI
//!
//! Lists controllers, monitors a live connection, and decodes or encodes
//! reports offline for inspecting captures.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use padlink_hid_dualsense_protocol::BatteryDecodeMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{TransportArg, codec, device};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "padctl")]
#[command(about = "DualSense controller tool - list, monitor, and drive controllers over USB or Bluetooth")]
#[command(version)]
#[command(long_about = "
padctl talks to a single DualSense controller over USB or Bluetooth.
It can watch decoded input live, push lightbar/rumble/trigger settings,
and decode or encode raw reports without any hardware attached.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Connection configuration (JSON)
    #[arg(long, global = true, env = "PADCTL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected controllers
    List,

    /// Print connection and input events
    Monitor {
        /// Stop after this many seconds
        #[arg(short, long, value_name = "SECONDS")]
        duration: Option<u64>,
    },

    /// Decode a captured input report
    Decode {
        /// Transport the report was captured on
        #[arg(short, long, value_enum)]
        transport: TransportArg,

        /// Apply the non-zero battery flag test instead of the literal one
        #[arg(long)]
        corrected_battery: bool,

        /// Report bytes in hex, including the report ID
        #[arg(required = true, num_args = 1.., value_name = "HEX")]
        bytes: Vec<String>,
    },

    /// Print the output report for a state
    Encode {
        #[arg(short, long, value_enum)]
        transport: TransportArg,

        /// Output state (JSON); defaults to everything off
        #[arg(short, long, value_name = "FILE")]
        state: Option<PathBuf>,
    },

    /// Connect to a controller and apply an output state
    Apply {
        /// Output state (JSON)
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        /// Keep the connection open for this many seconds
        #[arg(long, default_value = "1", value_name = "SECONDS")]
        hold: u64,

        /// Give up if no controller connects within this many seconds
        #[arg(long, default_value = "10", value_name = "SECONDS")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("padctl={log_level},padlink_connection={log_level},padlink_hid_common={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = execute_command(&cli).await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::List => {
            let config = commands::load_config(cli.config.as_deref())?;
            device::list(&config, cli.json)
        }
        Commands::Monitor { duration } => {
            let config = commands::load_config(cli.config.as_deref())?;
            device::monitor(config, duration.map(Duration::from_secs), cli.json).await
        }
        Commands::Decode {
            transport,
            corrected_battery,
            bytes,
        } => {
            let battery_mode = if *corrected_battery {
                BatteryDecodeMode::Corrected
            } else {
                commands::load_config(cli.config.as_deref())?.battery_mode
            };
            codec::decode(bytes, (*transport).into(), battery_mode, cli.json)
        }
        Commands::Encode { transport, state } => {
            codec::encode(state.as_deref(), (*transport).into(), cli.json)
        }
        Commands::Apply {
            state,
            hold,
            timeout,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let output_state = commands::load_output_state(state)?;
            device::apply(
                config,
                output_state,
                Duration::from_secs(*timeout),
                Duration::from_secs(*hold),
                cli.json,
            )
            .await
        }
    }
}
