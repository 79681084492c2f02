//! # Musicracy Player Library (musicracy-player)
//!
//! Crowd-voted playback: listeners vote on tracks, the most-voted track plays
//! next, and a timer advances to the following track shortly before the
//! current one ends so the remote device can play it without a gap.
//!
//! **Architecture:** a single controller task owns all playback-timing state
//! and processes events one at a time; the vote-ranked queue is a separate
//! lock-guarded structure that request handlers vote into directly.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod dedup;
pub mod error;
pub mod playback;
pub mod session;

pub use error::{Error, Result};
pub use musicracy_common::Track;
pub use session::Session;
