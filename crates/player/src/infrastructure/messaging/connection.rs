//! Push connection state and lifecycle.
//!
//! The transport task writes a [`SharedConnectionState`]; the runner reads it
//! through a [`ConnectionStateObserver`] and stops the task with a
//! [`ConnectionHandle`].

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

/// Where the push transport currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnectionState {
    #[default]
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    /// Lost the socket, waiting out the backoff before the next attempt
    Reconnecting = 3,
    /// Gave up after the last retry
    Failed = 4,
}

impl From<u8> for ConnectionState {
    fn from(raw: u8) -> Self {
        match raw {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Connection state shared by the transport task and its observers.
#[derive(Debug, Clone, Default)]
pub struct SharedConnectionState(Arc<AtomicU8>);

impl SharedConnectionState {
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    pub fn observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver {
            state: self.clone(),
        }
    }
}

/// Read-only view of a push connection's state.
#[derive(Debug, Clone)]
pub struct ConnectionStateObserver {
    state: SharedConnectionState,
}

impl ConnectionStateObserver {
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Stops a push transport. Dropping the handle leaves the transport running.
pub struct ConnectionHandle {
    disconnect_tx: oneshot::Sender<()>,
}

impl ConnectionHandle {
    pub(crate) fn new(disconnect_tx: oneshot::Sender<()>) -> Self {
        Self { disconnect_tx }
    }

    /// Stop reconnecting and close the socket.
    pub fn disconnect(self) {
        let _ = self.disconnect_tx.send(());
    }
}
