//! Error types for musicracy-player

use thiserror::Error;

/// Main error type for musicracy-player
#[derive(Error, Debug)]
pub enum Error {
    /// A playback device command (play/pause/stop/enqueue) failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// No voted track, no fallback track, and the catalog refill came back empty
    #[error("Playlist exhausted: no voted or default tracks left")]
    ExhaustedPlaylist,

    /// Default playlist could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Dedup store failure
    #[error("Dedup store error: {0}")]
    Dedup(#[from] musicracy_kv::KvError),

    /// The controller processed Finish and accepts no more events
    #[error("Playback controller has finished")]
    ControllerFinished,

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using musicracy-player Error
pub type Result<T> = std::result::Result<T, Error>;
