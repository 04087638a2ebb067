//! Connection states and published events.

use padlink_hid_dualsense_protocol::{InputState, Transport};
use serde::Serialize;

/// Position of the connection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Discovering,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Discovering | Self::Connecting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Discovering => "discovering",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

/// Broadcast to every [`subscribe`](crate::ConnectionManager::subscribe)r.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConnectionEvent {
    /// The device was connected or lost. `transport` is the transport of the
    /// connection that was established or dropped.
    StatusChanged {
        connected: bool,
        transport: Transport,
    },
    /// A decoded input report differed from the previous one.
    InputChanged { state: Box<InputState> },
}

impl ConnectionEvent {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::StatusChanged { connected: true, .. })
    }

    pub fn is_disconnection(&self) -> bool {
        matches!(
            self,
            Self::StatusChanged {
                connected: false,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(ConnectionState::Discovering.is_transitioning());
        assert!(!ConnectionState::Disconnected.is_transitioning());
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_event_json_shape() -> Result<(), serde_json::Error> {
        let event = ConnectionEvent::StatusChanged {
            connected: true,
            transport: Transport::WirelessRadio,
        };
        assert!(event.is_connection());
        assert_eq!(
            serde_json::to_string(&event)?,
            r#"{"event":"status_changed","connected":true,"transport":"wireless_radio"}"#
        );
        Ok(())
    }
}
