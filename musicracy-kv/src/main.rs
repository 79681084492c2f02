//! musicracy-kv - vote dedup store service
//!
//! Remembers which listener voted for which track so front ends can refuse
//! duplicate votes. Everything lives in memory; a restart forgets all votes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use musicracy_common::config::{
    resolve_setting, TomlConfig, DEFAULT_KEY_SEPARATOR, DEFAULT_KV_PORT,
};
use musicracy_kv::{build_router, AppState, KvStore};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for musicracy-kv
#[derive(Parser, Debug)]
#[command(name = "musicracy-kv")]
#[command(about = "Vote dedup key-value store for musicracy")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(short, long, env = "MUSICRACY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0", env = "SIMPLE_KV_HOST")]
    host: String,

    /// Port to listen on (env: SIMPLE_KV_PORT, config: [kv].port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Separator splitting composite keys into fields (env: MULTIFIELD_KEY_SEPARATOR)
    #[arg(long)]
    key_separator: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("musicracy_kv={},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting musicracy-kv v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let port = resolve_setting(args.port, "SIMPLE_KV_PORT", Some(config.kv.port), DEFAULT_KV_PORT);
    let key_separator = resolve_setting(
        args.key_separator,
        "MULTIFIELD_KEY_SEPARATOR",
        Some(config.kv.key_separator.clone()),
        DEFAULT_KEY_SEPARATOR.to_string(),
    );
    anyhow::ensure!(!key_separator.is_empty(), "key separator must not be empty");

    let state = AppState::new(Arc::new(KvStore::new()), &key_separator);
    let app = build_router(state);

    let ip: std::net::IpAddr = args
        .host
        .parse()
        .with_context(|| format!("Invalid listen address {}", args.host))?;
    let addr = SocketAddr::new(ip, port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("musicracy-kv listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down the kv store");
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
