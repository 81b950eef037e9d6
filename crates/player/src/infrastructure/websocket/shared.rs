//! Shared helpers for the push transport.
//!
//! Runtime-agnostic (no tokio) so the backoff math and URL building can be
//! tested without a socket.

use keyparty_domain::EventCode;
use url::Url;

// Reconnection constants
pub const INITIAL_RETRY_DELAY_MS: u64 = 1_000;
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Query parameter carrying the event code on the socket URL.
pub const EVENT_QUERY_PARAM: &str = "event";

/// Socket URL for one event's push stream.
///
/// Any existing `event` parameter is replaced; other parameters are kept.
pub fn push_url(ws_url: &str, event_code: &EventCode) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(ws_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != EVENT_QUERY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(EVENT_QUERY_PARAM, event_code.as_str());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> EventCode {
        EventCode::new("tuesday-keys").unwrap()
    }

    #[test]
    fn test_push_url_adds_event_param() {
        let url = push_url("ws://localhost:3000/ws", &code()).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:3000/ws?event=tuesday-keys");
    }

    #[test]
    fn test_push_url_replaces_existing_event_param() {
        let url = push_url("wss://example.org/push?token=x&event=old", &code()).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://example.org/push?token=x&event=tuesday-keys"
        );
    }

    #[test]
    fn test_push_url_rejects_garbage() {
        assert!(push_url("::", &code()).is_err());
    }
}
