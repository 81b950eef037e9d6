//! WebSocket push transport (tokio-tungstenite).

mod bridge;
mod client;
mod core;
mod shared;

pub use bridge::{connect_push_channel, connect_with_channel, PushConnection};
pub use shared::{push_url, MAX_RETRY_ATTEMPTS};

pub(crate) use self::core::BackoffState;
