//! Default playlist stored as a TOML file
//!
//! ```toml
//! [[track]]
//! id = "spotify:track:4uLU6hMCjMI75M1A2tKUQC"
//! name = "Never Gonna Give You Up"
//! artist = "Rick Astley"
//! album = "Whenever You Need Somebody"
//! length = 213.5
//! ```

use super::CatalogSource;
use crate::error::{Error, Result};
use async_trait::async_trait;
use musicracy_common::Track;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PlaylistDocument {
    #[serde(default, rename = "track")]
    tracks: Vec<Track>,
}

/// Playlist file re-read on every refill, so edits apply without a restart
#[derive(Debug, Clone)]
pub struct PlaylistFile {
    path: PathBuf,
}

impl PlaylistFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse playlist TOML content
    pub fn parse(content: &str) -> Result<Vec<Track>> {
        let document: PlaylistDocument =
            toml::from_str(content).map_err(|e| Error::Catalog(format!("Invalid playlist: {}", e)))?;
        Ok(document.tracks)
    }
}

#[async_trait]
impl CatalogSource for PlaylistFile {
    async fn default_tracks(&self) -> Result<Vec<Track>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Catalog(format!("Failed to read playlist {}: {}", self.path.display(), e))
        })?;
        let tracks = Self::parse(&content)?;
        debug!("Loaded {} default tracks from {}", tracks.len(), self.path.display());
        Ok(tracks)
    }
}
