//! musicracy-player - headless crowd-voted playback daemon
//!
//! Plays the default playlist through the logging device and keeps advancing
//! until interrupted. Votes arrive through the library API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use musicracy_common::config::{resolve_setting, TomlConfig};
use musicracy_kv::KvClient;
use musicracy_player::backend::{LogBackend, PlaybackBackend};
use musicracy_player::catalog::{CatalogSource, PlaylistFile};
use musicracy_player::config::PlayerConfig;
use musicracy_player::dedup::{DedupStore, NoDedup};
use musicracy_player::Session;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for musicracy-player
#[derive(Parser, Debug)]
#[command(name = "musicracy-player")]
#[command(about = "Crowd-voted playback controller for musicracy")]
#[command(version)]
struct Args {
    /// Path to config file (env: MUSICRACY_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default playlist TOML file (env: MUSICRACY_PLAYLIST)
    #[arg(long)]
    playlist: Option<PathBuf>,

    /// Seconds before a track ends at which the next one is staged (env: MUSICRACY_PRELOAD_WINDOW)
    #[arg(long)]
    preload_window: Option<f64>,

    /// Dedup store base URL (env: MUSICRACY_KV_URL)
    #[arg(long)]
    kv_url: Option<String>,

    /// Accept every vote without consulting a dedup store
    #[arg(long)]
    no_dedup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var_os("MUSICRACY_CONFIG").map(PathBuf::from));
    let toml_config =
        TomlConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &toml_config.logging.level;
                format!("musicracy_player={},musicracy_kv={}", level, level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting musicracy-player v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config = PlayerConfig::from_toml(&toml_config);

    let preload_secs = resolve_setting(
        args.preload_window,
        "MUSICRACY_PRELOAD_WINDOW",
        Some(toml_config.player.preload_window_secs),
        musicracy_common::config::DEFAULT_PRELOAD_WINDOW_SECS,
    );
    config.preload_window = Duration::try_from_secs_f64(preload_secs)
        .with_context(|| format!("Invalid preload window {}", preload_secs))?;

    let playlist = args
        .playlist
        .or_else(|| std::env::var_os("MUSICRACY_PLAYLIST").map(PathBuf::from))
        .or_else(|| config.default_playlist.clone())
        .context(
            "No default playlist configured (use --playlist, MUSICRACY_PLAYLIST or [player].default_playlist)",
        )?;
    info!("Default playlist: {}", playlist.display());

    let dedup: Arc<dyn DedupStore> = if args.no_dedup {
        info!("Vote dedup disabled");
        Arc::new(NoDedup)
    } else {
        // The [kv] section already falls back to its compiled defaults
        let url = resolve_setting(args.kv_url, "MUSICRACY_KV_URL", None, config.kv_url.clone());
        let client = KvClient::new(url, config.kv_max_retries);
        if let Err(e) = client.ping().await {
            warn!("Dedup store at {} not reachable yet: {}", client.base_url(), e);
        }
        Arc::new(client)
    };

    let catalog: Arc<dyn CatalogSource> = Arc::new(PlaylistFile::new(playlist));
    let backend: Arc<dyn PlaybackBackend> = Arc::new(LogBackend::new());
    let session = Session::start(&config, backend, catalog, dedup);

    session.play().await.context("Failed to start playback")?;

    shutdown_signal().await;

    session.finish().await.context("Failed to finish session")?;
    info!("Shutting down the player");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
