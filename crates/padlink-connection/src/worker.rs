//! Background connection cycle.

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};
use padlink_hid_common::{DeviceCandidate, DeviceHandle, HidError, HidResult, TransportProvider};
use padlink_hid_dualsense_protocol::ids::{CALIBRATION_REPORT_LEN, report_ids};
use padlink_hid_dualsense_protocol::{InputDecoder, Transport, validate_input_report};
use tracing::{debug, info, trace, warn};

use crate::config::ConnectionConfig;
use crate::events::ConnectionState;
use crate::manager::{ActiveConnection, Shared};

/// How a connected polling session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollExit {
    Lost,
    Cancelled,
}

pub(crate) struct Worker {
    provider: Arc<dyn TransportProvider>,
    config: ConnectionConfig,
    shared: Arc<Shared>,
    cancel_rx: Receiver<()>,
    decoder: InputDecoder,
}

impl Worker {
    pub(crate) fn new(
        provider: Arc<dyn TransportProvider>,
        config: ConnectionConfig,
        shared: Arc<Shared>,
        cancel_rx: Receiver<()>,
    ) -> Self {
        let decoder = InputDecoder::new(config.battery_mode);
        Self {
            provider,
            config,
            shared,
            cancel_rx,
            decoder,
        }
    }

    pub(crate) fn run(mut self) {
        info!(
            vendor_id = format_args!("0x{:04X}", self.config.vendor_id),
            product_id = format_args!("0x{:04X}", self.config.product_id),
            "Connection worker started"
        );

        while !self.is_cancelled() {
            // Nothing usable yet; keep discovering after the retry delay.
            let Some((candidate, transport)) = self.discover() else {
                if !self.pause(self.config.retry_delay()) {
                    break;
                }
                continue;
            };

            if let Err(e) = self.connect(&candidate, transport) {
                warn!(path = %candidate.path, %transport, error = %e, "Connection attempt failed");
                self.shared.transition_to(ConnectionState::Discovering);
                if !self.pause(self.config.retry_delay()) {
                    break;
                }
                continue;
            }

            match self.poll(transport) {
                PollExit::Cancelled => break,
                PollExit::Lost => {
                    if !self.pause(self.config.retry_delay()) {
                        break;
                    }
                }
            }
        }

        self.shared.release_on_shutdown();
        self.shared.transition_to(ConnectionState::Disconnected);
        info!("Connection worker stopped");
    }

    fn is_cancelled(&self) -> bool {
        !matches!(self.cancel_rx.try_recv(), Err(TryRecvError::Empty))
    }

    /// Sleep for `duration` unless cancelled first. Returns `false` on
    /// cancellation.
    fn pause(&self, duration: Duration) -> bool {
        matches!(
            self.cancel_rx.recv_timeout(duration),
            Err(RecvTimeoutError::Timeout)
        )
    }

    /// Find the first candidate with a recognised transport.
    fn discover(&mut self) -> Option<(DeviceCandidate, Transport)> {
        self.shared.transition_to(ConnectionState::Discovering);

        let candidates = match self
            .provider
            .enumerate(self.config.vendor_id, self.config.product_id)
        {
            Ok(candidates) => candidates,
            Err(e) if e.is_retryable() => {
                debug!(error = %e, "No controller found");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Enumeration rejected");
                return None;
            }
        };

        candidates.into_iter().find_map(|candidate| {
            match Transport::from_input_report_len(candidate.input_report_len) {
                Some(transport) => {
                    debug!(path = %candidate.path, %transport, "Classified controller");
                    Some((candidate, transport))
                }
                None => {
                    debug!(
                        path = %candidate.path,
                        len = candidate.input_report_len,
                        "Skipping device with unrecognised input report length"
                    );
                    None
                }
            }
        })
    }

    fn connect(&mut self, candidate: &DeviceCandidate, transport: Transport) -> HidResult<()> {
        self.shared.transition_to(ConnectionState::Connecting);

        let mut handle = self.provider.open(&candidate.path)?;
        if transport == Transport::WirelessRadio {
            bluetooth_handshake(handle.as_mut())?;
        }

        self.decoder.reset();
        self.shared.install(ActiveConnection { handle, transport });

        let output = *self.shared.output.lock();
        if let Some(output) = output {
            match self.shared.write_output(&output) {
                Ok(_) => debug!("Re-applied output state after connect"),
                Err(e) => debug!(error = %e, "Re-applying output state failed"),
            }
        }
        Ok(())
    }

    /// Poll the connected device until the connection is lost or the worker
    /// is cancelled.
    fn poll(&mut self, transport: Transport) -> PollExit {
        let mut buf = vec![0u8; transport.input_report_len()];
        let read_timeout = self.config.read_timeout();
        let poll_yield = self.config.poll_yield();
        let mut flush_warned = false;

        loop {
            if self.is_cancelled() {
                return PollExit::Cancelled;
            }

            let outcome = {
                let mut slot = self.shared.slot.lock();
                // Released by the write path.
                let Some(connection) = slot.as_mut() else {
                    return PollExit::Lost;
                };

                if let Err(e) = connection.handle.flush_queue() {
                    if flush_warned {
                        trace!(error = %e, "Input queue flush failed");
                    } else {
                        warn!(error = %e, "Input queue flush failed; continuing without flush");
                        flush_warned = true;
                    }
                }

                match connection.handle.read(&mut buf, read_timeout) {
                    Err(e) => {
                        let reason = format!("read failed: {e}");
                        self.shared.release_locked(&mut slot, &reason);
                        return PollExit::Lost;
                    }
                    Ok(n) => n,
                }
            };

            if outcome > 0 {
                let report = buf.get(..outcome).unwrap_or(buf.as_slice());
                if validate_input_report(report, transport) {
                    let state = self.decoder.decode(report, transport);
                    self.shared.publish_input(state);
                } else {
                    trace!(
                        len = outcome,
                        id = report.first().copied().unwrap_or_default(),
                        "Dropped unexpected input report"
                    );
                }
            }

            if !self.pause(poll_yield) {
                return PollExit::Cancelled;
            }
        }
    }
}

/// Request the calibration feature report, which switches a Bluetooth
/// controller into full input report mode.
fn bluetooth_handshake(handle: &mut dyn DeviceHandle) -> HidResult<()> {
    let mut buf = [0u8; CALIBRATION_REPORT_LEN];
    if let Some(id) = buf.first_mut() {
        *id = report_ids::FEATURE_CALIBRATION;
    }
    match handle.get_feature_report(&mut buf) {
        Ok(0) => Err(HidError::BluetoothHandshakeFailed(
            "empty calibration report".to_string(),
        )),
        Ok(n) => {
            debug!(bytes = n, "Bluetooth handshake complete");
            Ok(())
        }
        Err(e) => Err(HidError::BluetoothHandshakeFailed(e.to_string())),
    }
}
