//! Player configuration

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use keyparty_domain::{
    Access, EventCode, LevelBounds, DEFAULT_ITEM_LEVEL_MAX, DEFAULT_ITEM_LEVEL_MIN,
    DEFAULT_KEYSTONE_MAX_LEVEL, DEFAULT_KEYSTONE_MIN_LEVEL,
};

use crate::application::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::state::ReconcilePolicy;

/// Player configuration loaded from environment
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// REST API base URL
    pub api_url: String,
    /// Push channel URL (derived from `api_url` when unset)
    pub ws_url: String,
    /// Event this player follows
    pub event_code: EventCode,
    /// Operator or observer
    pub access: Access,
    /// What a parties refetch does when it races a local write
    pub reconcile: ReconcilePolicy,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Item level and keystone level bounds for character forms
    pub bounds: LevelBounds,
}

impl PlayerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("KEYPARTY_API_URL")
            .unwrap_or_else(|| "http://localhost:3000/api".to_string());
        let ws_url = match lookup("KEYPARTY_WS_URL") {
            Some(url) => url,
            None => derive_ws_url(&api_url)?,
        };

        let event_code = lookup("KEYPARTY_EVENT_CODE")
            .context("KEYPARTY_EVENT_CODE environment variable is required")?;
        let event_code =
            EventCode::new(event_code).context("KEYPARTY_EVENT_CODE must be a valid event code")?;

        let access = match lookup("KEYPARTY_OPERATOR").as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => Access::Operator,
            _ => Access::Observer,
        };

        let reconcile = match lookup("KEYPARTY_RECONCILE") {
            Some(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
            None => ReconcilePolicy::default(),
        };

        let request_timeout_ms: u64 = lookup("KEYPARTY_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| DEFAULT_REQUEST_TIMEOUT_MS.to_string())
            .parse()
            .context("KEYPARTY_REQUEST_TIMEOUT_MS must be a number of milliseconds")?;

        let bound = |key: &str, default: u32| -> Result<u32> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a non-negative integer", key)),
                None => Ok(default),
            }
        };
        let bounds = LevelBounds::new(
            bound("ITEM_LEVEL_MIN", DEFAULT_ITEM_LEVEL_MIN)?,
            bound("ITEM_LEVEL_MAX", DEFAULT_ITEM_LEVEL_MAX)?,
            bound("KEYSTONE_MIN_LEVEL", DEFAULT_KEYSTONE_MIN_LEVEL)?,
            bound("KEYSTONE_MAX_LEVEL", DEFAULT_KEYSTONE_MAX_LEVEL)?,
        )
        .context("Invalid level bounds")?;

        Ok(Self {
            api_url,
            ws_url,
            event_code,
            access,
            reconcile,
            request_timeout: Duration::from_millis(request_timeout_ms),
            bounds,
        })
    }
}

/// `http(s)://host/api` becomes `ws(s)://host/ws`.
fn derive_ws_url(api_url: &str) -> Result<String> {
    let mut url = url::Url::parse(api_url)
        .with_context(|| format!("KEYPARTY_API_URL is not a valid URL: {}", api_url))?;
    let scheme = match url.scheme() {
        "https" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| anyhow!("Cannot derive a push URL from {}", api_url))?;
    url.set_path("/ws");
    url.set_query(None);
    Ok(url.to_string())
}

/// Load `.env.local` then `.env`; earlier files win.
pub fn load_dotenv() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            PlayerConfig::from_lookup(lookup(&[("KEYPARTY_EVENT_CODE", "tuesday-keys")])).unwrap();

        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.ws_url, "ws://localhost:3000/ws");
        assert_eq!(config.access, Access::Observer);
        assert_eq!(config.reconcile, ReconcilePolicy::Versioned);
        assert_eq!(config.request_timeout, Duration::from_millis(10_000));
        assert_eq!(config.bounds, LevelBounds::default());
    }

    #[test]
    fn test_event_code_is_required() {
        let err = PlayerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("KEYPARTY_EVENT_CODE"));
    }

    #[test]
    fn test_overrides() {
        let config = PlayerConfig::from_lookup(lookup(&[
            ("KEYPARTY_EVENT_CODE", "tuesday-keys"),
            ("KEYPARTY_API_URL", "https://keys.example.org/api"),
            ("KEYPARTY_OPERATOR", "true"),
            ("KEYPARTY_RECONCILE", "last-response-wins"),
            ("ITEM_LEVEL_MIN", "600"),
            ("KEYSTONE_MAX_LEVEL", "20"),
        ]))
        .unwrap();

        assert_eq!(config.ws_url, "wss://keys.example.org/ws");
        assert_eq!(config.access, Access::Operator);
        assert_eq!(config.reconcile, ReconcilePolicy::LastResponseWins);
        assert_eq!(config.bounds.item_level_min(), 600);
        assert_eq!(config.bounds.keystone_max_level(), 20);
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let result = PlayerConfig::from_lookup(lookup(&[
            ("KEYPARTY_EVENT_CODE", "tuesday-keys"),
            ("KEYSTONE_MIN_LEVEL", "25"),
            ("KEYSTONE_MAX_LEVEL", "10"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_reconcile_policy_is_rejected() {
        let result = PlayerConfig::from_lookup(lookup(&[
            ("KEYPARTY_EVENT_CODE", "tuesday-keys"),
            ("KEYPARTY_RECONCILE", "newest"),
        ]));
        assert!(result.is_err());
    }
}
