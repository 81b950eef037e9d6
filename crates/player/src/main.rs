//! Keyparty Player - command-line composition root.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keyparty_player::config::{load_dotenv, PlayerConfig};
use keyparty_player::runner::{self, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env files
    load_dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyparty_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Keyparty Player");

    let command = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Command>().map_err(anyhow::Error::msg)?,
        None => Command::default(),
    };

    let config = PlayerConfig::from_env()?;
    runner::run(config, command).await
}
