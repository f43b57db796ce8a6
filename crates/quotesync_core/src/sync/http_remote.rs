//! HTTP remote source backed by a blocking `reqwest` client.
//!
//! # Responsibility
//! - List posts from the mock endpoint and post new quotes to it.
//!
//! # Invariants
//! - Every request is bounded by the configured timeout.
//! - A listing never yields more than the requested limit.
//! - Response bodies are never logged; only status and sizes are.

use crate::config::SyncConfig;
use crate::model::quote::Quote;
use crate::sync::remote::{RemotePost, RemoteSource, SyncError, SyncResult};
use log::{debug, info};
use reqwest::blocking::Client;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("quotesync/", env!("CARGO_PKG_VERSION"));

pub struct HttpRemoteSource {
    client: Client,
    endpoint: String,
}

impl HttpRemoteSource {
    /// Builds a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(network_error)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteSource for HttpRemoteSource {
    fn fetch_posts(&self, limit: u32) -> SyncResult<Vec<RemotePost>> {
        let started_at = Instant::now();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("limit", limit), ("_limit", limit)])
            .send()
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let body = response.text().map_err(network_error)?;
        let mut posts: Vec<RemotePost> =
            serde_json::from_str(&body).map_err(|err| SyncError::Decode(err.to_string()))?;
        let received = posts.len();
        // Servers that ignore the query parameters still yield at most `limit`.
        posts.truncate(limit as usize);
        debug!(
            "event=http_fetch module=sync status={} received={} records={} duration_ms={}",
            status.as_u16(),
            received,
            posts.len(),
            started_at.elapsed().as_millis()
        );
        Ok(posts)
    }

    fn push_quote(&self, quote: &Quote) -> SyncResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(quote)
            .send()
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }
        info!(
            "event=http_push module=sync status={} body_bytes={}",
            status.as_u16(),
            response.content_length().unwrap_or(0)
        );
        Ok(())
    }
}

fn network_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        return SyncError::Network(format!("request timed out: {err}"));
    }
    SyncError::Network(err.to_string())
}
