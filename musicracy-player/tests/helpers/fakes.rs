//! In-memory collaborator fakes

use async_trait::async_trait;
use musicracy_player::backend::{Initialization, PlaybackBackend};
use musicracy_player::catalog::CatalogSource;
use musicracy_player::dedup::DedupStore;
use musicracy_player::{Error, Result, Track};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Track with a given length in seconds
pub fn track(id: &str, length_secs: f64) -> Track {
    Track::new(id, format!("Song {}", id), "Test Artist", "Test Album", length_secs)
}

/// Device command as seen by the fake backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initialize,
    Play,
    Pause,
    Stop,
    Enqueue(String),
    Finish,
}

/// Records successful commands; fails every command while `failing` is set
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    failing: AtomicBool,
    already_playing: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// What `initialize` reports about the device
    pub fn set_already_playing(&self, playing: bool) {
        self.already_playing.store(playing, Ordering::SeqCst);
    }

    fn record(&self, call: Call) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Backend(format!("injected failure on {:?}", call)));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl PlaybackBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn play(&self) -> Result<()> {
        self.record(Call::Play)
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause)
    }

    async fn stop(&self) -> Result<()> {
        self.record(Call::Stop)
    }

    async fn enqueue(&self, track_id: &str) -> Result<()> {
        self.record(Call::Enqueue(track_id.to_string()))
    }

    async fn initialize(&self) -> Result<Initialization> {
        self.record(Call::Initialize)?;
        Ok(Initialization {
            playing: self.already_playing.load(Ordering::SeqCst),
        })
    }

    async fn finish(&self) -> Result<()> {
        self.record(Call::Finish)
    }
}

/// Fixed default playlist that counts how often it is read
#[derive(Debug, Default)]
pub struct CountingCatalog {
    tracks: Vec<Track>,
    refills: AtomicUsize,
}

impl CountingCatalog {
    pub fn new(tracks: Vec<Track>) -> Arc<Self> {
        Arc::new(Self {
            tracks,
            refills: AtomicUsize::new(0),
        })
    }

    pub fn refills(&self) -> usize {
        self.refills.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for CountingCatalog {
    async fn default_tracks(&self) -> Result<Vec<Track>> {
        self.refills.fetch_add(1, Ordering::SeqCst);
        Ok(self.tracks.clone())
    }
}

/// Dedup store kept in memory
#[derive(Debug, Default)]
pub struct RecordingDedup {
    votes: Mutex<HashMap<String, HashSet<String>>>,
    retired: Mutex<Vec<String>>,
    fail_retire: AtomicBool,
}

impl RecordingDedup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Track ids retired so far, in order
    pub fn retired(&self) -> Vec<String> {
        self.retired.lock().unwrap().clone()
    }

    pub fn set_fail_retire(&self, fail: bool) {
        self.fail_retire.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DedupStore for RecordingDedup {
    async fn has_voted(&self, voter: &str, track_id: &str) -> Result<bool> {
        let votes = self.votes.lock().unwrap();
        Ok(votes.get(voter).is_some_and(|ids| ids.contains(track_id)))
    }

    async fn record_vote(&self, voter: &str, track_id: &str) -> Result<()> {
        self.votes
            .lock()
            .unwrap()
            .entry(voter.to_string())
            .or_default()
            .insert(track_id.to_string());
        Ok(())
    }

    async fn retire(&self, track_id: &str) -> Result<()> {
        if self.fail_retire.load(Ordering::SeqCst) {
            return Err(Error::Internal("dedup store unavailable".to_string()));
        }
        for ids in self.votes.lock().unwrap().values_mut() {
            ids.remove(track_id);
        }
        self.retired.lock().unwrap().push(track_id.to_string());
        Ok(())
    }
}
