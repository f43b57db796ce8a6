//! Pull/merge and push reconciliation against a remote source.
//!
//! # Responsibility
//! - Map remote records into quotes and merge them by text.
//! - Send locally added quotes as best-effort notifications.
//!
//! # Invariants
//! - The service lock is never held across a network call.
//! - Repeated pulls of the same batch do not grow the collection.
//! - A failed push never touches local state.

use crate::model::quote::Quote;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::quote_service::QuoteService;
use crate::sync::remote::{RemotePost, RemoteSource, SyncNotice, SyncObserver, SyncResult};
use log::{info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

pub const DEFAULT_SERVER_CATEGORY: &str = "server";
pub const DEFAULT_BATCH_LIMIT: u32 = 5;

#[derive(Clone)]
pub struct Reconciler {
    remote: Arc<dyn RemoteSource>,
    observer: Arc<dyn SyncObserver>,
    server_category: String,
    batch_limit: u32,
}

impl Reconciler {
    pub fn new(remote: Arc<dyn RemoteSource>, observer: Arc<dyn SyncObserver>) -> Self {
        Self {
            remote,
            observer,
            server_category: DEFAULT_SERVER_CATEGORY.to_string(),
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    pub fn with_server_category(mut self, category: impl Into<String>) -> Self {
        self.server_category = category.into();
        self
    }

    pub fn with_batch_limit(mut self, limit: u32) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Runs one pull cycle and returns how many quotes were merged.
    ///
    /// Failures are logged and reported to the observer before being returned.
    pub fn pull_once<D: KeyValueStore, S: KeyValueStore>(
        &self,
        service: &Mutex<QuoteService<D, S>>,
    ) -> SyncResult<usize> {
        let started_at = Instant::now();
        let result = self.fetch_and_merge(service);
        match &result {
            Ok(added) => {
                info!(
                    "event=sync_pull module=sync status=ok added={} duration_ms={}",
                    added,
                    started_at.elapsed().as_millis()
                );
                if *added > 0 {
                    self.observer.notify(SyncNotice::Merged { added: *added });
                }
            }
            Err(err) => {
                warn!(
                    "event=sync_pull module=sync status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                self.observer.notify(SyncNotice::PullFailed {
                    message: err.to_string(),
                });
            }
        }
        result
    }

    /// Sends one quote to the remote; failure is reported, never rolled back.
    pub fn push(&self, quote: &Quote) -> SyncResult<()> {
        let result = self.remote.push_quote(quote);
        match &result {
            Ok(()) => info!("event=sync_push module=sync status=ok"),
            Err(err) => {
                warn!("event=sync_push module=sync status=error error={err}");
                self.observer.notify(SyncNotice::PushFailed {
                    message: err.to_string(),
                });
            }
        }
        result
    }

    /// Maps at most `batch_limit` remote records into quotes.
    ///
    /// Records with a missing, null or blank title are skipped.
    pub fn map_posts(&self, posts: Vec<RemotePost>) -> Vec<Quote> {
        posts
            .into_iter()
            .take(self.batch_limit as usize)
            .filter_map(|post| post.title)
            .filter_map(|title| Quote::new(title, &self.server_category).ok())
            .collect()
    }

    fn fetch_and_merge<D: KeyValueStore, S: KeyValueStore>(
        &self,
        service: &Mutex<QuoteService<D, S>>,
    ) -> SyncResult<usize> {
        let posts = self.remote.fetch_posts(self.batch_limit)?;
        let candidates = self.map_posts(posts);
        let mut guard = service.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.merge_remote(candidates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::Reconciler;
    use crate::model::quote::Quote;
    use crate::sync::remote::{LogObserver, RemotePost, RemoteSource, SyncError, SyncResult};
    use std::sync::Arc;

    struct EmptyRemote;

    impl RemoteSource for EmptyRemote {
        fn fetch_posts(&self, _limit: u32) -> SyncResult<Vec<RemotePost>> {
            Ok(Vec::new())
        }

        fn push_quote(&self, _quote: &Quote) -> SyncResult<()> {
            Err(SyncError::Status(500))
        }
    }

    #[test]
    fn map_posts_uses_title_and_fixed_category() {
        let reconciler = Reconciler::new(Arc::new(EmptyRemote), Arc::new(LogObserver))
            .with_server_category("ServerSync");
        let mapped = reconciler.map_posts(vec![
            RemotePost::titled(" sunt aut facere "),
            RemotePost::titled("   "),
            RemotePost::default(),
        ]);
        assert_eq!(mapped, vec![Quote::new("sunt aut facere", "ServerSync").unwrap()]);
    }

    #[test]
    fn map_posts_never_exceeds_batch_limit() {
        let reconciler =
            Reconciler::new(Arc::new(EmptyRemote), Arc::new(LogObserver)).with_batch_limit(3);
        let posts = (0..10)
            .map(|n| RemotePost::titled(format!("post {n}")))
            .collect();
        let mapped = reconciler.map_posts(posts);
        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped[2].text(), "post 2");
    }

    #[test]
    fn push_returns_remote_error() {
        let reconciler = Reconciler::new(Arc::new(EmptyRemote), Arc::new(LogObserver));
        let err = reconciler
            .push(&Quote::new("a", "b").unwrap())
            .unwrap_err();
        assert!(matches!(err, SyncError::Status(500)));
    }
}
