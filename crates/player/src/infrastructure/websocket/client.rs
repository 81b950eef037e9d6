//! Push transport using tokio-tungstenite

use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use keyparty_shared::PushMessage;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::infrastructure::messaging::{ConnectionState, PushChannel, SharedConnectionState};

use super::shared::MAX_RETRY_ATTEMPTS;
use super::BackoffState;

/// Reads push frames from the backend and dispatches them on a `PushChannel`.
///
/// The client only receives; the backend never expects anything but pongs.
pub struct PushClient {
    url: Url,
    channel: PushChannel,
    state: SharedConnectionState,
}

impl PushClient {
    pub fn new(url: Url, channel: PushChannel, state: SharedConnectionState) -> Self {
        Self {
            url,
            channel,
            state,
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.set(state);
    }

    /// Connect and read until the socket closes.
    ///
    /// Returns `Ok(())` once a connection was established and later lost, and
    /// an error if the connection could not be established at all. With
    /// `resync`, every refresh kind is dispatched right after connecting
    /// because messages sent while disconnected are not replayed.
    async fn connect_internal(&self, resync: bool) -> Result<()> {
        self.set_state(ConnectionState::Connecting);

        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        tracing::info!(url = %self.url, "Push channel connected");
        self.set_state(ConnectionState::Connected);

        if resync {
            tracing::info!("Push channel reconnected, refreshing everything");
            self.channel.dispatch(PushMessage::CharacterUpdated);
            self.channel.dispatch(PushMessage::PartiesUpdated);
            self.channel.dispatch(PushMessage::EventUpdated);
        }

        let (mut write, mut read) = ws_stream.split();
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let message = PushMessage::parse(&text);
                    self.channel.dispatch(message);
                }
                Ok(Message::Ping(data)) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        tracing::warn!(error = %e, "Failed to answer ping");
                        break;
                    }
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!(?frame, "Server closed push channel");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Push channel error");
                    break;
                }
            }
        }

        self.set_state(ConnectionState::Disconnected);
        Ok(())
    }

    /// Keep the push channel connected until retries are exhausted.
    ///
    /// Runs until cancelled by the bridge or until `MAX_RETRY_ATTEMPTS`
    /// consecutive attempts fail, which leaves the state at `Failed`.
    pub async fn run(&self) {
        let mut backoff = BackoffState::default();
        let mut connected_before = false;
        let mut first_attempt = true;

        loop {
            if !first_attempt {
                self.set_state(ConnectionState::Reconnecting);
                let Some(delay) = backoff.next_delay_and_advance() else {
                    tracing::error!("Max reconnection attempts reached, giving up");
                    self.set_state(ConnectionState::Failed);
                    return;
                };
                tracing::info!(
                    attempt = backoff.attempts(),
                    max_attempts = MAX_RETRY_ATTEMPTS,
                    delay_ms = delay,
                    "Reconnecting push channel"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            first_attempt = false;

            match self.connect_internal(connected_before).await {
                Ok(()) => {
                    connected_before = true;
                    backoff.reset();
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attempt = backoff.attempts(),
                        "Push channel connection failed"
                    );
                    self.set_state(ConnectionState::Disconnected);
                }
            }
        }
    }
}
