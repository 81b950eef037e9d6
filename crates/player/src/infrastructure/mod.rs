//! Infrastructure layer - adapters for the outbound ports
//!
//! HTTP persistence, the push transport and platform storage.

pub mod http_client;
pub mod messaging;
pub mod platform;
pub mod websocket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use http_client::HttpApiAdapter;
pub use messaging::{ConnectionState, PushChannel};
