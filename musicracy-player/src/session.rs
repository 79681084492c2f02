//! Playback session facade
//!
//! Wires one vote-ranked queue and one playback controller together for the
//! lifetime of a listening session. Votes go straight into the queue; playback
//! commands go through the controller inbox.

use crate::backend::PlaybackBackend;
use crate::catalog::CatalogSource;
use crate::config::PlayerConfig;
use crate::dedup::DedupStore;
use crate::error::{Error, Result};
use crate::playback::{
    ControllerHandle, ControllerStatus, PlaybackController, PlaybackEvent, PlaybackState,
    RankedEntry, VoteRankedQueue,
};
use musicracy_common::Track;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A running playback session
pub struct Session {
    queue: Arc<VoteRankedQueue>,
    controller: ControllerHandle,
    worker: Mutex<Option<JoinHandle<()>>>,
    backend: Arc<dyn PlaybackBackend>,
    dedup: Arc<dyn DedupStore>,
    bootstrapped: AtomicBool,
}

impl Session {
    /// Build the queue and spawn the controller, starting `Stopped`
    pub fn start(
        config: &PlayerConfig,
        backend: Arc<dyn PlaybackBackend>,
        catalog: Arc<dyn CatalogSource>,
        dedup: Arc<dyn DedupStore>,
    ) -> Self {
        let queue = Arc::new(VoteRankedQueue::new(catalog, Arc::clone(&dedup)));
        let (controller, worker) =
            PlaybackController::spawn(Arc::clone(&queue), Arc::clone(&backend), config.preload_window);

        Self {
            queue,
            controller,
            worker: Mutex::new(Some(worker)),
            backend,
            dedup,
            bootstrapped: AtomicBool::new(false),
        }
    }

    /// Cast a vote, returning the track's new vote count
    ///
    /// The first vote of a session that is still stopped sends `Initialize`,
    /// which prepares the device and stages the first track. A failed
    /// bootstrap is logged and the next vote tries again; the vote itself
    /// still counts.
    pub async fn vote(&self, track: Track) -> Result<u32> {
        let votes = self.queue.vote(track).await;

        if self.controller.status().state == PlaybackState::Stopped
            && !self.bootstrapped.swap(true, Ordering::SeqCst)
        {
            debug!("First vote, bootstrapping playback");
            match self.controller.request(PlaybackEvent::Initialize).await {
                Ok(()) => {}
                Err(Error::ControllerFinished) => return Err(Error::ControllerFinished),
                Err(e) => {
                    warn!("Bootstrap failed, retrying on next vote: {}", e);
                    self.bootstrapped.store(false, Ordering::SeqCst);
                }
            }
        }

        Ok(votes)
    }

    /// Cast a vote on behalf of `voter`, ignoring repeat votes
    ///
    /// Returns `false` when `voter` already has a pending vote for the track.
    pub async fn vote_as(&self, voter: &str, track: Track) -> Result<bool> {
        if self.dedup.has_voted(voter, &track.id).await? {
            info!("Ignoring repeat vote by {} for {}", voter, track.id);
            return Ok(false);
        }
        self.dedup.record_vote(voter, &track.id).await?;
        self.vote(track).await?;
        Ok(true)
    }

    /// Pending votes, most-voted first
    pub async fn playlist(&self) -> Vec<RankedEntry> {
        self.queue.snapshot().await
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.queue.current_track().await
    }

    pub async fn play(&self) -> Result<()> {
        self.controller.play().await
    }

    pub async fn pause(&self) -> Result<()> {
        self.controller.pause().await
    }

    pub async fn stop(&self) -> Result<()> {
        self.controller.stop().await
    }

    pub fn status(&self) -> ControllerStatus {
        self.controller.status()
    }

    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    pub fn queue(&self) -> &Arc<VoteRankedQueue> {
        &self.queue
    }

    /// End the session: stop the controller loop and release the device
    pub async fn finish(&self) -> Result<()> {
        match self.controller.finish().await {
            Ok(()) | Err(Error::ControllerFinished) => {}
            Err(e) => return Err(e),
        }

        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                warn!("Playback controller task failed: {}", e);
            }
            self.backend.finish().await?;
            info!("Session finished");
        }
        Ok(())
    }
}
