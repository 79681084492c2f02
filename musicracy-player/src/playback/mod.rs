//! Vote-ranked queue and the timer-driven playback controller

pub mod controller;
pub mod state;
pub mod timer;
pub mod vote_queue;

pub use controller::{ControllerHandle, PlaybackController};
pub use state::{ControllerStatus, PlaybackEvent, PlaybackState};
pub use timer::OneShotTimer;
pub use vote_queue::{RankedEntry, VoteRankedQueue};
