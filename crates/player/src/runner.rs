//! Composition root: wires adapters into a roster store and runs a command.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::api::Api;
use crate::application::services::RosterService;
use crate::config::PlayerConfig;
use crate::infrastructure::platform::DesktopStorageProvider;
use crate::infrastructure::websocket::connect_with_channel;
use crate::infrastructure::{HttpApiAdapter, PushChannel};
use crate::state::{RosterSnapshot, RosterStore};

/// What the binary does once the store is wired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Command {
    /// Follow push events and log every change until Ctrl-C
    #[default]
    Watch,
    /// Fetch once and log the roster
    Summary,
    /// Shuffle parties (operator only), then log the result
    Shuffle,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watch" => Ok(Self::Watch),
            "summary" => Ok(Self::Summary),
            "shuffle" => Ok(Self::Shuffle),
            other => Err(format!("unknown command: {other} (expected watch, summary or shuffle)")),
        }
    }
}

pub fn build_store(config: &PlayerConfig) -> Result<RosterStore> {
    let raw_api = Arc::new(
        HttpApiAdapter::new(&config.api_url, config.request_timeout)
            .context("Failed to create HTTP client")?,
    );
    let service = RosterService::new(Api::new(raw_api));
    let storage = Arc::new(DesktopStorageProvider::new());

    Ok(RosterStore::new(
        config.event_code.clone(),
        config.access,
        config.reconcile,
        config.bounds,
        service,
        storage,
    ))
}

pub async fn run(config: PlayerConfig, command: Command) -> Result<()> {
    tracing::info!("Configuration loaded");
    tracing::info!("  API: {}", config.api_url);
    tracing::info!("  Push: {}", config.ws_url);
    tracing::info!("  Event: {} ({})", config.event_code, config.access);

    let store = build_store(&config)?;

    match command {
        Command::Summary => {
            store.refresh_all().await?;
            log_snapshot(&store.snapshot());
        }
        Command::Shuffle => {
            store.refresh_all().await?;
            store.shuffle().await?;
            log_snapshot(&store.snapshot());
        }
        Command::Watch => watch(&config, &store).await?,
    }

    Ok(())
}

async fn watch(config: &PlayerConfig, store: &RosterStore) -> Result<()> {
    let channel = PushChannel::new();
    let _subscription = store.attach(&channel);
    let connection = connect_with_channel(channel, &config.ws_url, &config.event_code)
        .context("KEYPARTY_WS_URL is not a valid URL")?;

    if let Err(e) = store.refresh_all().await {
        tracing::warn!(error = %e, "Initial refresh failed, waiting for push events");
    }

    let mut snapshots = store.subscribe();
    log_snapshot(&snapshots.borrow_and_update().clone());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, disconnecting...");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                tracing::debug!(connection = ?connection.state_observer.state(), "Roster changed");
                log_snapshot(&snapshot);
            }
        }
    }

    connection.handle.disconnect();
    Ok(())
}

fn log_snapshot(snapshot: &RosterSnapshot) {
    if let Some(error) = &snapshot.last_error {
        tracing::warn!("{}", error);
    }

    tracing::info!(
        revision = snapshot.revision,
        characters = snapshot.characters.len(),
        parties = snapshot.parties.len(),
        pending = snapshot.pending.len(),
        visible = snapshot.parties_visible(),
        "Roster"
    );

    for (index, party) in snapshot.parties.iter().enumerate() {
        let names: Vec<&str> = party.members().iter().map(|m| m.name().as_str()).collect();
        let roles = party.role_counts();
        let utilities = party.utilities();
        tracing::info!(
            party = index + 1,
            tank = roles.tank,
            heal = roles.heal,
            cac = roles.cac,
            dist = roles.dist,
            blood_lust = utilities.blood_lust,
            battle_rez = utilities.battle_rez,
            "  {}",
            names.join(", ")
        );
    }

    for (role, characters) in snapshot.pending_by_role() {
        let names: Vec<&str> = characters.iter().map(|c| c.name().as_str()).collect();
        tracing::info!("  pending {}: {}", role, names.join(", "));
    }

    if let Some(me) = &snapshot.self_character {
        match snapshot.self_party_index {
            Some(index) => tracing::info!("  you: {} in party {}", me.name(), index + 1),
            None => tracing::info!("  you: {} (not placed)", me.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!("watch".parse::<Command>().unwrap(), Command::Watch);
        assert_eq!(" Summary".parse::<Command>().unwrap(), Command::Summary);
        assert_eq!("SHUFFLE".parse::<Command>().unwrap(), Command::Shuffle);
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn test_store_uses_configured_bounds() {
        let config = PlayerConfig::from_lookup(|key| match key {
            "KEYPARTY_EVENT_CODE" => Some("tuesday-keys".to_string()),
            "ITEM_LEVEL_MAX" => Some("600".to_string()),
            "KEYSTONE_MAX_LEVEL" => Some("10".to_string()),
            _ => None,
        })
        .unwrap();

        let store = build_store(&config).unwrap();

        assert_eq!(store.bounds(), config.bounds);
        assert_eq!(store.bounds().item_level_max(), 600);
    }
}
