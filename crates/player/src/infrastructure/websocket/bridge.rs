//! WebSocket Bridge - connects the push transport to a `PushChannel`.
//!
//! `connect_push_channel` spawns a background task that owns the socket,
//! dispatches frames on the channel, reconnects with backoff, and stops when
//! the `ConnectionHandle` asks it to.

use keyparty_domain::EventCode;
use tokio::sync::oneshot;

use crate::infrastructure::messaging::{
    ConnectionHandle, ConnectionState, ConnectionStateObserver, PushChannel, SharedConnectionState,
};

use super::client::PushClient;
use super::shared::push_url;

/// Result of creating a push connection.
///
/// - `channel`: subscribe refresh callbacks here
/// - `handle`: control connection lifecycle
/// - `state_observer`: observe connection state
pub struct PushConnection {
    pub channel: PushChannel,
    pub handle: ConnectionHandle,
    pub state_observer: ConnectionStateObserver,
}

/// Open the push stream of one event on a fresh channel.
///
/// Must be called from within a tokio runtime.
pub fn connect_push_channel(
    ws_url: &str,
    event_code: &EventCode,
) -> Result<PushConnection, url::ParseError> {
    connect_with_channel(PushChannel::new(), ws_url, event_code)
}

/// Open the push stream of one event, dispatching on an existing channel.
///
/// Lets subscribers register before the first frame can arrive.
pub fn connect_with_channel(
    channel: PushChannel,
    ws_url: &str,
    event_code: &EventCode,
) -> Result<PushConnection, url::ParseError> {
    let url = push_url(ws_url, event_code)?;

    let (disconnect_tx, disconnect_rx) = oneshot::channel::<()>();
    let state = SharedConnectionState::default();
    let state_observer = state.observer();

    let client = PushClient::new(url, channel.clone(), state.clone());
    tokio::spawn(async move {
        push_bridge_task(client, disconnect_rx, state).await;
    });

    Ok(PushConnection {
        channel,
        handle: ConnectionHandle::new(disconnect_tx),
        state_observer,
    })
}

async fn push_bridge_task(
    client: PushClient,
    disconnect_rx: oneshot::Receiver<()>,
    state: SharedConnectionState,
) {
    tokio::select! {
        _ = disconnect_rx => {
            tracing::info!("Push channel disconnect requested");
            state.set(ConnectionState::Disconnected);
        }
        _ = client.run() => {
            tracing::warn!("Push channel transport stopped");
        }
    }
}
