//! # Musicracy Common Library
//!
//! Shared code for the musicracy services:
//! - Track value type
//! - Error types
//! - Bootstrap configuration loading

pub mod config;
pub mod error;
pub mod track;

pub use error::{Error, Result};
pub use track::Track;
