//! Remote collaborator contracts and sync notices.
//!
//! # Responsibility
//! - Define the remote source SPI used by reconciliation.
//! - Define the notice hook raised toward the presentation layer.
//!
//! # Invariants
//! - `SyncError` is never fatal to a caller's polling loop.

use crate::model::quote::Quote;
use crate::repo::kv_repo::RepoError;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of one pull or push round trip.
#[derive(Debug)]
pub enum SyncError {
    /// Transport failure, including timeouts.
    Network(String),
    /// Remote answered with a non-success status.
    Status(u16),
    /// Response payload could not be decoded.
    Decode(String),
    /// Merged quotes could not be persisted.
    Storage(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Status(code) => write!(f, "remote returned status {code}"),
            Self::Decode(message) => write!(f, "malformed remote payload: {message}"),
            Self::Storage(err) => write!(f, "failed to persist merged quotes: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// One record returned by the remote listing endpoint.
///
/// Only `title` is read. Every other field, `id` included, is ignored so
/// servers that use string or UUID ids still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemotePost {
    #[serde(default)]
    pub title: Option<String>,
}

impl RemotePost {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

/// Remote source SPI.
pub trait RemoteSource: Send + Sync {
    /// Fetches at most `limit` records.
    fn fetch_posts(&self, limit: u32) -> SyncResult<Vec<RemotePost>>;
    /// Sends one locally added quote. Response content is not interpreted.
    fn push_quote(&self, quote: &Quote) -> SyncResult<()>;
}

/// Human-facing outcome of a sync activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotice {
    Merged { added: usize },
    PullFailed { message: String },
    PushFailed { message: String },
}

impl Display for SyncNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merged { added: 1 } => write!(f, "1 new quote synced from server"),
            Self::Merged { added } => write!(f, "{added} new quotes synced from server"),
            Self::PullFailed { message } => write!(f, "sync with server failed: {message}"),
            Self::PushFailed { message } => write!(f, "failed to send quote to server: {message}"),
        }
    }
}

/// Presentation hook for sync notices.
pub trait SyncObserver: Send + Sync {
    fn notify(&self, notice: SyncNotice);
}

/// Observer that only writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SyncObserver for LogObserver {
    fn notify(&self, notice: SyncNotice) {
        match notice {
            SyncNotice::Merged { added } => {
                info!("event=sync_notice module=sync kind=merged added={added}")
            }
            SyncNotice::PullFailed { message } => {
                warn!("event=sync_notice module=sync kind=pull_failed error={message}")
            }
            SyncNotice::PushFailed { message } => {
                warn!("event=sync_notice module=sync kind=push_failed error={message}")
            }
        }
    }
}
