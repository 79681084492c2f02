//! Vote dedup seam
//!
//! Remembers which voter already voted for which track. The remote key-value
//! service stores the voter address as the key and the track id as a value;
//! retiring a track deletes its id under every voter so people can vote for it
//! again once it has played.

use crate::error::Result;
use async_trait::async_trait;
use musicracy_kv::KvClient;

/// Per-voter vote bookkeeping
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Whether `voter` already has a pending vote for `track_id`
    async fn has_voted(&self, voter: &str, track_id: &str) -> Result<bool>;

    /// Remember that `voter` voted for `track_id`
    async fn record_vote(&self, voter: &str, track_id: &str) -> Result<()>;

    /// Forget every vote for `track_id`
    async fn retire(&self, track_id: &str) -> Result<()>;
}

#[async_trait]
impl DedupStore for KvClient {
    async fn has_voted(&self, voter: &str, track_id: &str) -> Result<bool> {
        let voted = self.retrieve(voter).await?;
        Ok(voted.iter().any(|id| id == track_id))
    }

    async fn record_vote(&self, voter: &str, track_id: &str) -> Result<()> {
        self.store(voter, track_id).await?;
        Ok(())
    }

    async fn retire(&self, track_id: &str) -> Result<()> {
        self.delete(track_id).await?;
        Ok(())
    }
}

/// Accepts every vote; used when no dedup store is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDedup;

#[async_trait]
impl DedupStore for NoDedup {
    async fn has_voted(&self, _voter: &str, _track_id: &str) -> Result<bool> {
        Ok(false)
    }

    async fn record_vote(&self, _voter: &str, _track_id: &str) -> Result<()> {
        Ok(())
    }

    async fn retire(&self, _track_id: &str) -> Result<()> {
        Ok(())
    }
}
