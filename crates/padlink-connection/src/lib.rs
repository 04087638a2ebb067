//! Connection lifecycle for a single DualSense controller.
//!
//! [`ConnectionManager`] owns a background worker that cycles through
//! `Disconnected → Discovering → Connecting → Connected`, decodes input
//! reports and publishes them, and writes output reports when the caller
//! changes the [`OutputState`](padlink_hid_dualsense_protocol::OutputState).
//! Any read or write failure drops the connection and the cycle starts over.

#![deny(static_mut_refs)]

pub mod config;
pub mod events;
pub mod manager;
mod worker;

pub use config::ConnectionConfig;
pub use events::{ConnectionEvent, ConnectionState};
pub use manager::ConnectionManager;
pub use padlink_hid_common::{HidError, HidResult};
