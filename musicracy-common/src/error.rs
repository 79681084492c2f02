//! Common error types for musicracy

use thiserror::Error;

/// Common result type for musicracy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across musicracy services
#[derive(Error, Debug)]
pub enum Error {
    /// TOML parse error (wraps toml::de::Error)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
