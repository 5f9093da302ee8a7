use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Reachability of the tutor service as of the most recent probe or send.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// The last call reached the service and it answered 2xx.
    Online,

    /// The last call could not reach the service at all.
    #[default]
    Offline,

    /// The service answered, but with an error.
    Error,
}

impl ConnectionStatus {
    fn as_u8(self) -> u8 {
        match self {
            ConnectionStatus::Online => 0,
            ConnectionStatus::Offline => 1,
            ConnectionStatus::Error => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionStatus::Online,
            1 => ConnectionStatus::Offline,
            _ => ConnectionStatus::Error,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Online => write!(f, "online"),
            ConnectionStatus::Offline => write!(f, "offline"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// Shared cell holding the current [`ConnectionStatus`].
///
/// Written by the transport after every probe or send and read by whoever
/// renders the status.
#[derive(Debug, Default)]
pub struct ConnectionMonitor {
    status: AtomicU8,
}

impl ConnectionMonitor {
    /// Creates a monitor in the given state.
    pub fn new(status: ConnectionStatus) -> Self {
        Self {
            status: AtomicU8::new(status.as_u8()),
        }
    }

    /// Returns the current status.
    pub fn get(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    /// Records a new status, returning the previous one.
    pub fn set(&self, status: ConnectionStatus) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.status.swap(status.as_u8(), Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_starts_offline() {
        let monitor = ConnectionMonitor::default();
        assert_eq!(monitor.get(), ConnectionStatus::Offline);
    }

    #[test]
    fn monitor_swaps() {
        let monitor = ConnectionMonitor::new(ConnectionStatus::Online);
        assert_eq!(monitor.set(ConnectionStatus::Error), ConnectionStatus::Online);
        assert_eq!(monitor.get(), ConnectionStatus::Error);
    }

    #[test]
    fn status_serialization() {
        let json = serde_json::to_string(&ConnectionStatus::Offline).unwrap();
        assert_eq!(json, "\"offline\"");
        assert_eq!(ConnectionStatus::Error.to_string(), "error");
    }
}
