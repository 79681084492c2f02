//! Playback state and controller events

use musicracy_common::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Controller playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Running => write!(f, "running"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Events accepted by the controller inbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// First-vote bootstrap: prepare the device and stage the first track
    Initialize,
    Play,
    Pause,
    Stop,
    /// The auto-advance timer expired
    TimerFired,
    /// Terminal: the loop exits after handling it
    Finish,
}

impl std::fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaybackEvent::Initialize => "initialize",
            PlaybackEvent::Play => "play",
            PlaybackEvent::Pause => "pause",
            PlaybackEvent::Stop => "stop",
            PlaybackEvent::TimerFired => "timer_fired",
            PlaybackEvent::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// Snapshot of controller state published after every transition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerStatus {
    pub state: PlaybackState,
    /// Budget until the next auto-advance; `None` when stopped
    pub remaining: Option<Duration>,
    /// Last track staged on the device
    pub current_track: Option<Track>,
    /// When the armed auto-advance timer fires, if one is armed
    pub timer_deadline: Option<Instant>,
    /// Set once Finish has been processed
    pub finished: bool,
}
