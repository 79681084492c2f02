//! Track value type
//!
//! A track is produced once by a catalog lookup and never mutated afterwards.
//! On the wire and in playlist files the length is expressed in seconds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Immutable description of a playable track
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Opaque provider identifier (e.g. a provider URI)
    pub id: String,
    /// Display name
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Track length
    #[serde(with = "duration_secs")]
    pub length: Duration,
}

impl Track {
    /// Create a track from its length in seconds
    ///
    /// Negative or non-finite lengths are clamped to zero.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        length_secs: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: artist.into(),
            album: album.into(),
            length: Duration::try_from_secs_f64(length_secs).unwrap_or(Duration::ZERO),
        }
    }

    /// Track length
    pub fn length(&self) -> Duration {
        self.length
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.artist, self.name, self.id)
    }
}

/// (De)serialize a `Duration` as fractional seconds
mod duration_secs {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid track length {}: {}", secs, e)))
    }
}
