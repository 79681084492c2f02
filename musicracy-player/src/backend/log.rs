//! Headless backend that only logs the commands it receives

use super::{Initialization, PlaybackBackend};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Device stand-in for running the player without a remote device
#[derive(Debug, Default)]
pub struct LogBackend {
    staged: AtomicUsize,
}

impl LogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks staged so far
    pub fn staged_count(&self) -> usize {
        self.staged.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PlaybackBackend for LogBackend {
    fn name(&self) -> &str {
        "log"
    }

    async fn play(&self) -> Result<()> {
        info!("[device] play");
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        info!("[device] pause");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!("[device] stop");
        Ok(())
    }

    async fn enqueue(&self, track_id: &str) -> Result<()> {
        let n = self.staged.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[device] enqueue {} (#{})", track_id, n);
        Ok(())
    }

    async fn initialize(&self) -> Result<Initialization> {
        // Nothing to wait for: a log device is always ready and idle
        Ok(Initialization { playing: false })
    }
}
