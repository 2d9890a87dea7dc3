//! # Resonate
//!
//! Resolves a stream identifier to playable audio and prints the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use resonate_player::{LogUi, PlaybackService, PlayerState};
use resonate_sources::{ResolverConfig, StreamResolver};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable pointing at a JSON resolver configuration.
const CONFIG_ENV: &str = "RESONATE_CONFIG";

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let path = ProjectDirs::from("", "", "resonate")?
        .config_dir()
        .join("config.json");
    path.exists().then_some(path)
}

fn load_config() -> Result<ResolverConfig> {
    match config_path() {
        Some(path) => {
            info!("Loading config from {}", path.display());
            ResolverConfig::from_path(&path)
                .with_context(|| format!("invalid config at {}", path.display()))
        }
        None => {
            debug!("No config file, using built-in sources");
            Ok(ResolverConfig::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "resonate=info,resonate_sources=info,resonate_player=info".into()
            }),
        )
        .init();

    info!("Starting Resonate v{}", env!("CARGO_PKG_VERSION"));

    let Some(id) = std::env::args().nth(1) else {
        bail!("usage: resonate <stream-id>");
    };

    let config = load_config()?;
    let resolver = StreamResolver::from_config(&config)?;
    info!("Sources: {}", resolver.source_names().join(", "));

    let service = PlaybackService::new(resolver, Arc::new(PlayerState::new()), Arc::new(LogUi));
    match service.play(&id).await? {
        Some(now_playing) => {
            println!("{}", serde_json::to_string_pretty(&now_playing)?);
        }
        None => info!("Request for {id} was superseded"),
    }

    Ok(())
}
