//! Test helpers for musicracy-player integration tests
//!
//! - RecordingBackend: device fake that records commands and can fail on demand
//! - CountingCatalog: default playlist that counts refills
//! - RecordingDedup: in-memory dedup store that records retirements

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{track, Call, CountingCatalog, RecordingBackend, RecordingDedup};
