//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Default lead time before a track ends at which the next one is pre-staged
pub const DEFAULT_PRELOAD_WINDOW_SECS: f64 = 15.0;

/// Default dedup store port
pub const DEFAULT_KV_PORT: u16 = 5002;

/// Default number of connection retries against the dedup store
pub const DEFAULT_KV_MAX_RETRIES: u32 = 5;

/// Default separator for composite (multi-field) dedup store keys
pub const DEFAULT_KEY_SEPARATOR: &str = ",";

/// Configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub player: PlayerSection,
    pub kv: KvSection,
    pub logging: LoggingConfig,
}

/// `[player]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    /// Preload window in seconds
    pub preload_window_secs: f64,
    /// Curated default playlist used when nobody has voted
    pub default_playlist: Option<PathBuf>,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            preload_window_secs: DEFAULT_PRELOAD_WINDOW_SECS,
            default_playlist: None,
        }
    }
}

/// `[kv]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KvSection {
    pub host: String,
    pub port: u16,
    pub max_retries: u32,
    pub key_separator: String,
}

impl Default for KvSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_KV_PORT,
            max_retries: DEFAULT_KV_MAX_RETRIES,
            key_separator: DEFAULT_KEY_SEPARATOR.to_string(),
        }
    }
}

impl KvSection {
    /// Base URL of the dedup store
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// An explicit path must exist and parse. Without one, the platform config
    /// locations are searched and defaults are used when nothing is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
            })?;
            debug!("Loaded config file {}", path.display());
            return Self::from_toml_str(&content);
        }

        let Some(path) = find_config_file() else {
            warn!("No config file found, using built-in defaults");
            return Ok(Self::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    debug!("Loaded config file {}", path.display());
                    Ok(config)
                }
                Err(e) => {
                    warn!("Ignoring invalid config file {}: {}", path.display(), e);
                    Ok(Self::default())
                }
            },
            Err(e) => {
                warn!("Cannot read config file {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let preload = self.player.preload_window_secs;
        if !preload.is_finite() || preload < 0.0 {
            return Err(Error::Config(format!(
                "preload_window_secs must be a non-negative number, got {}",
                preload
            )));
        }
        if self.kv.key_separator.is_empty() {
            return Err(Error::Config("key_separator must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Resolve one setting following the priority order of this module
///
/// An environment value that fails to parse is ignored with a warning.
pub fn resolve_setting<T: FromStr>(
    cli_arg: Option<T>,
    env_var_name: &str,
    file_value: Option<T>,
    default: T,
) -> T {
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg {
        return value;
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(env_var_name) {
        match raw.parse::<T>() {
            Ok(value) => return value,
            Err(_) => warn!("Ignoring unparsable {}={:?}", env_var_name, raw),
        }
    }

    // Priority 3: TOML config file, then priority 4: compiled default
    file_value.unwrap_or(default)
}

/// Locate the config file for the platform
///
/// `~/.config/musicracy/config.toml` first, then `/etc/musicracy/config.toml`.
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("musicracy").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/musicracy/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}
