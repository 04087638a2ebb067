//! Public handle over the connection worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam::channel::Sender;
use padlink_hid_common::{DeviceHandle, HidError, HidResult, TransportProvider};
use padlink_hid_dualsense_protocol::{InputState, OutputState, Transport, encode_output_report};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, trace, warn};

use crate::config::ConnectionConfig;
use crate::events::{ConnectionEvent, ConnectionState};
use crate::worker::Worker;

/// The open device and the transport it was negotiated over.
pub(crate) struct ActiveConnection {
    pub(crate) handle: Box<dyn DeviceHandle>,
    pub(crate) transport: Transport,
}

/// State shared between the worker thread and the manager.
pub(crate) struct Shared {
    /// Reads and writes both go through this lock.
    pub(crate) slot: Mutex<Option<ActiveConnection>>,
    pub(crate) output: Mutex<Option<OutputState>>,
    pub(crate) connected: AtomicBool,
    state_tx: watch::Sender<ConnectionState>,
    input_tx: watch::Sender<InputState>,
    events_tx: broadcast::Sender<ConnectionEvent>,
}

impl Shared {
    fn new(event_capacity: usize) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (input_tx, _) = watch::channel(InputState::default());
        let (events_tx, _) = broadcast::channel(event_capacity);
        Self {
            slot: Mutex::new(None),
            output: Mutex::new(None),
            connected: AtomicBool::new(false),
            state_tx,
            input_tx,
            events_tx,
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub(crate) fn transition_to(&self, new_state: ConnectionState) {
        let previous = self.state_tx.send_replace(new_state);
        if previous != new_state {
            debug!(
                from = previous.as_str(),
                to = new_state.as_str(),
                "Connection state transition"
            );
        }
    }

    pub(crate) fn emit(&self, event: ConnectionEvent) {
        if self.events_tx.send(event).is_err() {
            trace!("No event subscribers");
        }
    }

    /// Publish `state` if it differs from the last published snapshot.
    pub(crate) fn publish_input(&self, state: InputState) {
        let changed = self.input_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            self.emit(ConnectionEvent::InputChanged {
                state: Box::new(state),
            });
        }
    }

    /// Install a freshly opened connection and announce it.
    pub(crate) fn install(&self, connection: ActiveConnection) {
        let transport = connection.transport;
        *self.slot.lock() = Some(connection);
        self.connected.store(true, Ordering::Release);
        self.transition_to(ConnectionState::Connected);
        info!(%transport, "Controller connected");
        self.emit(ConnectionEvent::StatusChanged {
            connected: true,
            transport,
        });
    }

    /// Take the connection out of `slot`, releasing the handle, and announce
    /// the loss. Returns `false` if another path already released it, so a
    /// single failure run produces exactly one lost event.
    pub(crate) fn release_locked(
        &self,
        slot: &mut Option<ActiveConnection>,
        reason: &str,
    ) -> bool {
        let Some(connection) = slot.take() else {
            return false;
        };
        let transport = connection.transport;
        drop(connection);

        self.connected.store(false, Ordering::Release);
        self.transition_to(ConnectionState::Disconnected);
        warn!(%transport, reason, "Controller connection lost");
        self.emit(ConnectionEvent::StatusChanged {
            connected: false,
            transport,
        });
        true
    }

    /// Release the connection without reporting it as lost.
    pub(crate) fn release_on_shutdown(&self) {
        let Some(connection) = self.slot.lock().take() else {
            return;
        };
        let transport = connection.transport;
        drop(connection);

        self.connected.store(false, Ordering::Release);
        info!(%transport, "Released controller on shutdown");
        self.emit(ConnectionEvent::StatusChanged {
            connected: false,
            transport,
        });
    }

    /// Encode and write `output` over the current connection, if any.
    ///
    /// A failed write drops the connection.
    pub(crate) fn write_output(&self, output: &OutputState) -> HidResult<bool> {
        let mut slot = self.slot.lock();
        let Some(connection) = slot.as_mut() else {
            return Ok(false);
        };
        let report = encode_output_report(output, connection.transport);
        match connection.handle.write(report.as_bytes()) {
            Ok(written) => {
                trace!(bytes = written, transport = %connection.transport, "Wrote output report");
                Ok(true)
            }
            Err(e) => {
                let reason = format!("write failed: {e}");
                self.release_locked(&mut slot, &reason);
                Err(e)
            }
        }
    }
}

/// Drives one controller through discovery, connection and polling on a
/// background thread.
///
/// Dropping the manager (or calling [`shutdown`](Self::shutdown)) cancels the
/// worker, releases the device and joins the thread.
pub struct ConnectionManager {
    shared: Arc<Shared>,
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Validate `config` and start the worker.
    ///
    /// # Errors
    ///
    /// [`HidError::InvalidArgument`] for an invalid configuration,
    /// [`HidError::Io`] if the worker thread cannot be spawned.
    pub fn start(
        provider: Arc<dyn TransportProvider>,
        config: ConnectionConfig,
    ) -> HidResult<Self> {
        config.validate()?;

        let shared = Arc::new(Shared::new(config.event_capacity));
        let (cancel_tx, cancel_rx) = crossbeam::channel::bounded(1);
        let worker = Worker::new(provider, config, Arc::clone(&shared), cancel_rx);

        let handle = thread::Builder::new()
            .name("padlink-connection".to_string())
            .spawn(move || worker.run())
            .map_err(HidError::Io)?;

        info!("Connection manager started");
        Ok(Self {
            shared,
            cancel_tx: Some(cancel_tx),
            worker: Some(handle),
        })
    }

    /// Receive every status change and input change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.shared.events_tx.subscribe()
    }

    /// Latest decoded input state.
    pub fn input_state(&self) -> watch::Receiver<InputState> {
        self.shared.input_tx.subscribe()
    }

    pub fn latest_input(&self) -> InputState {
        *self.shared.input_tx.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    pub fn transport(&self) -> Option<Transport> {
        self.shared.slot.lock().as_ref().map(|c| c.transport)
    }

    /// Last output state set, re-applied after every reconnect.
    pub fn output_state(&self) -> Option<OutputState> {
        *self.shared.output.lock()
    }

    /// Remember `output` and write it now if a device is connected.
    ///
    /// While disconnected the state is only stored; it is written as soon as
    /// the next connection is established.
    ///
    /// # Errors
    ///
    /// The write error if the device rejected the report. The connection is
    /// dropped in that case and the worker starts a new discovery cycle.
    pub fn set_output_state(&self, output: OutputState) -> HidResult<()> {
        *self.shared.output.lock() = Some(output);
        if !self.shared.write_output(&output)? {
            debug!("Output state stored; not connected");
        }
        Ok(())
    }

    /// Cancel the worker and wait for it to release the device.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the sender is the cancellation signal.
        self.cancel_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Connection worker panicked");
            }
            info!("Connection manager stopped");
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
