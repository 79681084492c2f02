//! musicracy-kv library - vote dedup store
//!
//! Tiny key-value service remembering which listener voted for which track.
//! Front ends record votes here; the player retires a track's votes once the
//! track has been played so listeners can vote for it again.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod client;
pub mod store;
pub mod wire;

pub use client::{KvClient, KvError};
pub use store::KvStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Backing storage
    pub store: Arc<KvStore>,
    /// Separator of composite keys
    pub key_separator: Arc<str>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<KvStore>, key_separator: &str) -> Self {
        Self {
            store,
            key_separator: Arc::from(key_separator),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(KvStore::new()), wire::MULTIFIELD_KEY_SEPARATOR)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::retrieve).post(api::submit))
        .route("/ping", get(api::ping))
        .route("/health", get(api::health))
        // Any other path ending in "ping" is a ping too
        .fallback(api::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
