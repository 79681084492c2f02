//! Vote-ranked track queue
//!
//! Decides which track plays next. `ranked` is kept non-decreasing in vote
//! count from head to tail, so the most-voted track is always at the tail and
//! popping it is O(1). Among equal counts, the track that reached the count
//! first sits closer to the tail.
//!
//! When nobody has voted, tracks are drawn from a fallback pool filled from the
//! default playlist. Voting for a fallback track promotes it into `ranked`.

use crate::catalog::CatalogSource;
use crate::dedup::DedupStore;
use crate::error::{Error, Result};
use musicracy_common::Track;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A track together with its pending vote count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub votes: u32,
    pub track: Track,
}

#[derive(Debug, Default)]
struct QueueInner {
    ranked: Vec<RankedEntry>,
    /// Track id -> index in `ranked`; rebuilt after every mutation
    positions: HashMap<String, usize>,
    fallback: HashMap<String, Track>,
    current: Option<Track>,
}

impl QueueInner {
    fn reindex(&mut self) {
        self.positions.clear();
        for (i, entry) in self.ranked.iter().enumerate() {
            self.positions.insert(entry.track.id.clone(), i);
        }
    }

    /// Take one fallback track, refilling the pool first when it is empty
    async fn take_fallback(&mut self, catalog: &dyn CatalogSource) -> Result<Track> {
        if self.fallback.is_empty() {
            let tracks = catalog.default_tracks().await?;
            self.fallback = tracks.into_iter().map(|t| (t.id.clone(), t)).collect();
            info!("Refilled fallback pool with {} tracks", self.fallback.len());
        }

        let id = self.fallback.keys().next().cloned();
        id.and_then(|id| self.fallback.remove(&id))
            .ok_or(Error::ExhaustedPlaylist)
    }
}

/// Lock-guarded vote-ranked queue, one per playback session
pub struct VoteRankedQueue {
    inner: Mutex<QueueInner>,
    catalog: Arc<dyn CatalogSource>,
    dedup: Arc<dyn DedupStore>,
}

impl VoteRankedQueue {
    pub fn new(catalog: Arc<dyn CatalogSource>, dedup: Arc<dyn DedupStore>) -> Self {
        Self {
            inner: Mutex::new(QueueInner::default()),
            catalog,
            dedup,
        }
    }

    /// Cast one vote for `track`, returning its new vote count
    pub async fn vote(&self, track: Track) -> u32 {
        let mut inner = self.inner.lock().await;

        let mut votes = 0;
        if let Some(&pos) = inner.positions.get(&track.id) {
            votes = inner.ranked.remove(pos).votes;
        } else if inner.fallback.remove(&track.id).is_some() {
            // First vote on a fallback track: straight to the head of `ranked`
            inner.ranked.insert(0, RankedEntry { votes: 1, track });
            inner.reindex();
            debug!("Promoted fallback track to ranked queue");
            return 1;
        }

        votes += 1;
        let (mut ranked, right): (Vec<_>, Vec<_>) =
            inner.ranked.drain(..).partition(|entry| entry.votes < votes);
        debug!("Track {} now has {} votes", track.id, votes);
        ranked.push(RankedEntry { votes, track });
        ranked.extend(right);
        inner.ranked = ranked;
        inner.reindex();

        votes
    }

    /// Remove and return the next track to play
    ///
    /// Prefers the most-voted track. Falls back to an arbitrary default
    /// playlist track, refilling the pool from the catalog when it is empty.
    /// Fails with [`Error::ExhaustedPlaylist`] when there is nothing to play.
    pub async fn pop_next(&self) -> Result<Track> {
        let (track, voted) = {
            let mut inner = self.inner.lock().await;
            let (track, voted) = match inner.ranked.pop() {
                Some(entry) => {
                    inner.positions.remove(&entry.track.id);
                    (entry.track, true)
                }
                None => (inner.take_fallback(self.catalog.as_ref()).await?, false),
            };
            inner.current = Some(track.clone());
            (track, voted)
        };

        if voted {
            // Track already left the queue; a stale dedup entry only blocks a re-vote
            if let Err(e) = self.dedup.retire(&track.id).await {
                warn!("Failed to retire votes for {}: {}", track.id, e);
            }
        }

        Ok(track)
    }

    /// Last track returned by [`pop_next`](Self::pop_next)
    pub async fn current_track(&self) -> Option<Track> {
        self.inner.lock().await.current.clone()
    }

    /// Number of tracks with pending votes
    pub async fn size(&self) -> usize {
        self.inner.lock().await.ranked.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.size().await == 0
    }

    /// Pending votes, most-voted first
    pub async fn snapshot(&self) -> Vec<RankedEntry> {
        self.inner.lock().await.ranked.iter().rev().cloned().collect()
    }

    /// Vote count for a track with pending votes
    pub async fn votes_for(&self, track_id: &str) -> Option<u32> {
        let inner = self.inner.lock().await;
        inner.positions.get(track_id).map(|&pos| inner.ranked[pos].votes)
    }

    /// Whether `track_id` is waiting in the fallback pool
    pub async fn in_fallback(&self, track_id: &str) -> bool {
        self.inner.lock().await.fallback.contains_key(track_id)
    }

    pub async fn fallback_len(&self) -> usize {
        self.inner.lock().await.fallback.len()
    }

    /// Check ordering and index consistency, describing the first violation
    pub async fn verify(&self) -> std::result::Result<(), String> {
        let inner = self.inner.lock().await;
        if let Some(w) = inner.ranked.windows(2).find(|w| w[0].votes > w[1].votes) {
            return Err(format!(
                "{} ({} votes) sits before {} ({} votes)",
                w[0].track.id, w[0].votes, w[1].track.id, w[1].votes
            ));
        }
        if inner.positions.len() != inner.ranked.len() {
            return Err(format!(
                "index has {} entries for {} ranked tracks",
                inner.positions.len(),
                inner.ranked.len()
            ));
        }
        for (i, entry) in inner.ranked.iter().enumerate() {
            if inner.positions.get(&entry.track.id) != Some(&i) {
                return Err(format!("index for {} does not point at {}", entry.track.id, i));
            }
        }
        Ok(())
    }
}
