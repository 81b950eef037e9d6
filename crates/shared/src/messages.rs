//! Push channel message types
//!
//! The backend emits signal-only notifications: receipt of a message means
//! "this resource is stale, refetch it in full". Frames carry no payload.
//!
//! ## Versioning Policy
//!
//! - New kinds can be added at the end (forward compatible)
//! - Unknown kinds deserialize to `Unknown` and are ignored by the client

use serde::{Deserialize, Serialize};

/// Notification pushed by the backend for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PushMessage {
    /// The roster changed (character registered, edited or removed)
    CharacterUpdated,
    /// The party layout changed
    PartiesUpdated,
    /// Event metadata changed (parties visibility)
    EventUpdated,
    /// Unknown message kind for forward compatibility
    #[serde(other)]
    Unknown,
}

impl PushMessage {
    pub const CHARACTER_UPDATED: &'static str = "character-updated";
    pub const PARTIES_UPDATED: &'static str = "parties-updated";
    pub const EVENT_UPDATED: &'static str = "event-updated";

    /// Wire name of this message kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CharacterUpdated => Self::CHARACTER_UPDATED,
            Self::PartiesUpdated => Self::PARTIES_UPDATED,
            Self::EventUpdated => Self::EVENT_UPDATED,
            Self::Unknown => "unknown",
        }
    }

    /// Parse a text frame.
    ///
    /// Accepts either a JSON object `{"type": "<name>"}` or the bare name
    /// (optionally JSON-quoted). Anything else is `Unknown`.
    pub fn parse(frame: &str) -> Self {
        let frame = frame.trim();
        if frame.starts_with('{') {
            return match serde_json::from_str::<Self>(frame) {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!(error = %e, "Unparseable push frame");
                    Self::Unknown
                }
            };
        }
        Self::from_name(frame.trim_matches('"'))
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            Self::CHARACTER_UPDATED => Self::CharacterUpdated,
            Self::PARTIES_UPDATED => Self::PartiesUpdated,
            Self::EVENT_UPDATED => Self::EventUpdated,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for PushMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
