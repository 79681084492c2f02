//! Remote playback device seam
//!
//! Every device integration implements the same fixed capability set. Device
//! specific extras (session setup, teardown) are named methods with default
//! implementations rather than anything attached at runtime.

pub mod log;

pub use self::log::LogBackend;

use crate::error::Result;
use async_trait::async_trait;

/// One-shot result of preparing the remote device for a session
///
/// Returned by [`PlaybackBackend::initialize`] and applied by the controller
/// itself; the backend never touches controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Initialization {
    /// The device reports it is already playing
    pub playing: bool,
}

/// Commands the controller issues to the remote playback device
///
/// Failures are returned to the controller operation that issued the
/// command; retrying is up to the caller or the implementation.
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Backend identifier for logs (e.g. "log", "spotify")
    fn name(&self) -> &str;

    /// Start or resume playback
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the position
    async fn pause(&self) -> Result<()>;

    /// Stop playback
    async fn stop(&self) -> Result<()>;

    /// Pre-stage a track on the device so it follows the current one
    async fn enqueue(&self, track_id: &str) -> Result<()>;

    /// Prepare the device for a new session
    async fn initialize(&self) -> Result<Initialization> {
        Ok(Initialization::default())
    }

    /// Release device-side resources at the end of a session
    async fn finish(&self) -> Result<()> {
        Ok(())
    }
}
