//! Push channel messaging infrastructure.
//!
//! - `PushChannel`: typed subscription bus for backend invalidations
//! - `SharedConnectionState`: transport state, read through an observer
//! - `ConnectionHandle`: stop the transport
//!
//! The WebSocket bridge (in the websocket module) feeds the channel from the
//! actual transport.

pub mod connection;
pub mod push_channel;

pub use connection::{
    ConnectionHandle, ConnectionState, ConnectionStateObserver, SharedConnectionState,
};
pub use push_channel::{PushChannel, RefreshCallback, RefreshCallbacks, Subscription};
