//! Commands that talk to a live controller

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use padlink_connection::{ConnectionConfig, ConnectionManager};
use padlink_hid_common::hidapi_provider::HidapiProvider;
use padlink_hid_common::{HidError, TransportProvider};
use padlink_hid_dualsense_protocol::{OutputState, Transport};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::error::CliError;
use crate::output;

fn open_provider() -> Result<Arc<dyn TransportProvider>> {
    let provider = HidapiProvider::new()
        .map_err(CliError::Transport)
        .context("Failed to initialise the HID stack")?;
    Ok(Arc::new(provider))
}

/// Enumerate matching controllers and classify their transport.
pub fn list(config: &ConnectionConfig, json: bool) -> Result<()> {
    let provider = open_provider()?;
    let candidates = match provider.enumerate(config.vendor_id, config.product_id) {
        Ok(candidates) => candidates,
        Err(HidError::TransportUnavailable { .. }) => Vec::new(),
        Err(e) => return Err(CliError::Transport(e).into()),
    };

    let classified: Vec<_> = candidates
        .into_iter()
        .map(|candidate| {
            let transport = Transport::from_input_report_len(candidate.input_report_len);
            (candidate, transport)
        })
        .collect();
    output::print_candidates(&classified, json);
    Ok(())
}

/// Run the connection manager and print its events until interrupted or
/// `duration` elapses.
pub async fn monitor(
    config: ConnectionConfig,
    duration: Option<Duration>,
    json: bool,
) -> Result<()> {
    let manager = ConnectionManager::start(open_provider()?, config).map_err(CliError::Transport)?;
    let mut events = manager.subscribe();

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    if !json {
        eprintln!("Waiting for controller... (Ctrl+C to stop)");
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => output::print_event(&event, json),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Monitor fell behind; events dropped"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            () = &mut deadline => break,
        }
    }

    shutdown(manager).await
}

/// Connect, write `state`, keep the connection for `hold`, then release it.
pub async fn apply(
    config: ConnectionConfig,
    state: OutputState,
    connect_timeout: Duration,
    hold: Duration,
    json: bool,
) -> Result<()> {
    let manager = ConnectionManager::start(open_provider()?, config).map_err(CliError::Transport)?;

    let mut state_rx = manager.state_changes();
    let connected = tokio::time::timeout(connect_timeout, state_rx.wait_for(|s| s.is_connected()))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false);
    if !connected {
        shutdown(manager).await?;
        return Err(CliError::DeviceNotFound(format!(
            "no controller connected within {}s",
            connect_timeout.as_secs()
        ))
        .into());
    }

    let transport = manager.transport();
    if let Err(e) = manager.set_output_state(state) {
        shutdown(manager).await?;
        return Err(CliError::Transport(e)).context("Failed to write output report");
    }

    if json {
        output::print_json(&serde_json::json!({
            "success": true,
            "transport": transport,
            "state": state,
        }));
    } else {
        let over = transport.map_or("unknown transport", output::transport_label);
        println!("Applied output state over {over}");
    }

    tokio::time::sleep(hold).await;
    shutdown(manager).await
}

/// Join the worker off the async runtime.
async fn shutdown(manager: ConnectionManager) -> Result<()> {
    tokio::task::spawn_blocking(move || manager.shutdown())
        .await
        .context("Connection worker join failed")
}
