//! HTTP client for the dedup store
//!
//! Connection-level failures (store not up yet, refused connection, timeout)
//! are retried with a fixed pause. HTTP error statuses are returned at once.

use crate::wire::{KvRequest, RetrieveResponse};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Pause between connection attempts
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Dedup store client errors
#[derive(Error, Debug)]
pub enum KvError {
    /// Store could not be reached within the retry budget
    #[error("Dedup store at {url} unreachable after {attempts} attempt(s): {source}")]
    Unreachable {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Store answered with an error status
    #[error("Dedup store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Any other transport or decoding error
    #[error("Dedup store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for one dedup store instance
#[derive(Debug, Clone)]
pub struct KvClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl KvClient {
    /// Create a client for the store at `base_url` (e.g. `http://simple_kv:5002`)
    pub fn new(base_url: impl Into<String>, max_retries: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Override the pause between connection attempts
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait until the store answers `/ping`
    pub async fn ping(&self) -> Result<(), KvError> {
        let url = format!("{}/ping", self.base_url);
        debug!("Pinging dedup store at {}", url);
        self.send(|| self.http.get(&url)).await?;
        Ok(())
    }

    /// Associate `value` with `key`
    pub async fn store(&self, key: &str, value: &str) -> Result<(), KvError> {
        let body = KvRequest::create(key, value);
        self.send(|| self.http.post(&self.base_url).json(&body)).await?;
        Ok(())
    }

    /// Values associated with `key`
    pub async fn retrieve(&self, key: &str) -> Result<Vec<String>, KvError> {
        let response = self
            .send(|| self.http.get(&self.base_url).query(&[("key", key)]))
            .await?;
        let body: RetrieveResponse = response.json().await?;
        Ok(body.value)
    }

    /// Remove `value` from every key it is associated with
    pub async fn delete(&self, value: &str) -> Result<(), KvError> {
        let body = KvRequest::delete(value);
        self.send(|| self.http.post(&self.base_url).json(&body)).await?;
        Ok(())
    }

    async fn send<F>(&self, build: F) -> Result<reqwest::Response, KvError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(KvError::Status { status, body });
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    if attempts > self.max_retries {
                        return Err(KvError::Unreachable {
                            url: self.base_url.clone(),
                            attempts,
                            source: e,
                        });
                    }
                    warn!(
                        "Dedup store not reachable (attempt {}/{}): {}",
                        attempts,
                        self.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(KvError::Http(e)),
            }
        }
    }
}
