//! Core domain logic for quotesync.
//! This crate is the single source of truth for quote collection invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod sync;

pub use config::{AppConfig, ConfigError, SyncConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::quote::{seed_quotes, Quote, QuoteValidationError, ALL_CATEGORIES};
pub use repo::kv_repo::{
    InMemoryKeyValueStore, KeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use repo::quote_storage::QuoteStorage;
pub use search::category_index::CategoryIndex;
pub use service::quote_service::{QuoteService, QuoteServiceError, ServiceResult};
pub use service::quote_store::QuoteStore;
pub use sync::http_remote::HttpRemoteSource;
pub use sync::reconciler::Reconciler;
pub use sync::remote::{
    LogObserver, RemotePost, RemoteSource, SyncError, SyncNotice, SyncObserver, SyncResult,
};
pub use sync::worker::{ReconcileWorker, WorkerStats};

use std::path::{Path, PathBuf};

/// Durable SQLite storage paired with a session-scoped SQLite slot.
pub type DefaultQuoteService = QuoteService<SqliteKeyValueStore, SqliteKeyValueStore>;

/// Opens the quote service over a SQLite file and the current session slot.
pub fn open_service(db_path: impl AsRef<Path>) -> RepoResult<DefaultQuoteService> {
    open_service_with_session(db_path, session_db_path())
}

/// Opens the quote service with an explicit session slot file.
pub fn open_service_with_session(
    db_path: impl AsRef<Path>,
    session_path: impl AsRef<Path>,
) -> RepoResult<DefaultQuoteService> {
    let durable = SqliteKeyValueStore::open(db_path)?;
    let session = SqliteKeyValueStore::open(session_path)?;
    Ok(QuoteService::open(QuoteStorage::new(durable, session)))
}

/// Session slot file shared by every invocation from the same parent shell.
pub fn session_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("quotesync-session-{}.sqlite3", session_key()))
}

#[cfg(unix)]
fn session_key() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(not(unix))]
fn session_key() -> u32 {
    std::process::id()
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, open_service_with_session, session_db_path};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn open_service_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.sqlite3");
        let session = dir.path().join("session.sqlite3");
        {
            let mut service = open_service_with_session(&path, &session).unwrap();
            service.add_quote("Persist me", "Durable").unwrap();
            service.set_filter("Durable").unwrap();
        }
        let service = open_service_with_session(&path, &session).unwrap();
        assert_eq!(service.len(), 4);
        assert_eq!(service.current_filter(), "Durable");
        assert_eq!(service.visible_quotes().len(), 1);
    }

    #[test]
    fn last_shown_survives_reopen_within_session_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.sqlite3");
        let session = dir.path().join("session.sqlite3");
        let shown = {
            let service = open_service_with_session(&path, &session).unwrap();
            assert_eq!(service.restore_last_shown(), None);
            service.show_random(&mut StdRng::seed_from_u64(3)).unwrap()
        };

        let reopened = open_service_with_session(&path, &session).unwrap();
        assert_eq!(reopened.restore_last_shown(), Some(shown));

        let other_session = dir.path().join("other-session.sqlite3");
        let fresh = open_service_with_session(&path, &other_session).unwrap();
        assert_eq!(fresh.restore_last_shown(), None);
    }

    #[test]
    fn session_slot_lives_in_temp_dir() {
        let path = session_db_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert_eq!(path, session_db_path());
    }
}
