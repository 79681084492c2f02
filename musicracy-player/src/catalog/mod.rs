//! Default-playlist sources for the fallback pool

pub mod file;

pub use file::PlaylistFile;

use crate::error::Result;
use async_trait::async_trait;
use musicracy_common::Track;

/// Supplies the curated tracks played when nobody has voted
///
/// Called by the vote-ranked queue each time its fallback pool runs dry.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Full default playlist; duplicates by id collapse in the pool
    async fn default_tracks(&self) -> Result<Vec<Track>>;
}

/// Fixed in-memory playlist
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tracks: Vec<Track>,
}

impl StaticCatalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn default_tracks(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }
}
