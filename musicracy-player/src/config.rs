//! musicracy-player specific configuration

use musicracy_common::config::TomlConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Lead time before a track ends at which the next track is pre-staged
    pub preload_window: Duration,
    /// Curated playlist drawn from when nobody has voted
    pub default_playlist: Option<PathBuf>,
    /// Dedup store base URL
    pub kv_url: String,
    /// Connection retries against the dedup store
    pub kv_max_retries: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}

impl PlayerConfig {
    /// Build from the shared TOML configuration
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            preload_window: Duration::from_secs_f64(config.player.preload_window_secs),
            default_playlist: config.player.default_playlist.clone(),
            kv_url: config.kv.base_url(),
            kv_max_retries: config.kv.max_retries,
        }
    }
}
