//! HTTP API handlers for musicracy-kv

pub mod health;
pub mod kv;

pub use health::{fallback, health, ping};
pub use kv::{retrieve, submit};
