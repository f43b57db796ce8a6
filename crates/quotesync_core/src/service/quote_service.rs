//! Quote use-case service.
//!
//! # Responsibility
//! - Orchestrate store mutation, persistence and category refresh.
//! - Provide the entry points raised by presentation intents.
//!
//! # Invariants
//! - Every mutation is validate, then mutate, then persist.
//! - A failed save rolls the in-memory store back to its previous length.
//! - The category index is recomputed after every successful mutation.

use crate::model::quote::{Quote, QuoteValidationError};
use crate::repo::kv_repo::{KeyValueStore, RepoError, RepoResult};
use crate::repo::quote_storage::QuoteStorage;
use crate::search::category_index::CategoryIndex;
use crate::service::quote_store::{random_of, QuoteStore};
use log::{info, warn};
use rand::Rng;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

/// Service error for quote use-cases.
#[derive(Debug)]
pub enum QuoteServiceError {
    /// Blank text or category.
    Validation(QuoteValidationError),
    /// Malformed or non-array import payload.
    Decode(String),
    /// Import/export file could not be read or written.
    Io(std::io::Error),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for QuoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Decode(message) => write!(f, "invalid quotes file: {message}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Decode(_) => None,
            Self::Io(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for QuoteServiceError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for QuoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<std::io::Error> for QuoteServiceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub type ServiceResult<T> = Result<T, QuoteServiceError>;

/// Quote service facade over store, storage and category index.
pub struct QuoteService<D: KeyValueStore, S: KeyValueStore> {
    store: QuoteStore,
    storage: QuoteStorage<D, S>,
    index: CategoryIndex,
}

impl<D: KeyValueStore, S: KeyValueStore> QuoteService<D, S> {
    /// Loads persisted state (or the seed) and builds the category index.
    pub fn open(storage: QuoteStorage<D, S>) -> Self {
        let store = QuoteStore::from_quotes(storage.load());
        let mut index = CategoryIndex::new(storage.load_filter());
        index.recompute(store.all());
        Self {
            store,
            storage,
            index,
        }
    }

    /// Adds one quote from raw user input.
    pub fn add_quote(
        &mut self,
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> ServiceResult<Quote> {
        let before = self.store.len();
        let quote = self.store.add(text, category)?;
        self.commit(before)?;
        info!(
            "event=quote_add module=service status=ok count={}",
            self.store.len()
        );
        Ok(quote)
    }

    /// Merges remote candidates by text; persists only when something was added.
    pub fn merge_remote(&mut self, candidates: Vec<Quote>) -> RepoResult<usize> {
        let before = self.store.len();
        let added = self.store.merge_remote(candidates);
        if added > 0 {
            self.commit(before)?;
        }
        Ok(added)
    }

    /// Appends every quote in a JSON array payload.
    ///
    /// # Errors
    /// - `Decode` when the payload is not JSON, not an array of quote objects,
    ///   or any element has blank text or category.
    ///
    /// The store is unchanged on any error.
    pub fn import_json(&mut self, payload: &str) -> ServiceResult<usize> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|err| QuoteServiceError::Decode(err.to_string()))?;
        if !value.is_array() {
            return Err(QuoteServiceError::Decode(
                "expected a JSON array of quotes".to_string(),
            ));
        }
        let quotes: Vec<Quote> = serde_json::from_value(value)
            .map_err(|err| QuoteServiceError::Decode(err.to_string()))?;

        let imported = quotes.len();
        let before = self.store.len();
        self.store.replace_all(quotes);
        self.commit(before)?;
        info!("event=quotes_import module=service status=ok imported={imported}");
        Ok(imported)
    }

    pub fn import_file(&mut self, path: impl AsRef<Path>) -> ServiceResult<usize> {
        let payload = fs::read_to_string(path)?;
        self.import_json(&payload)
    }

    /// Renders the full collection as a pretty-printed JSON array.
    pub fn export_json(&self) -> ServiceResult<String> {
        serde_json::to_string_pretty(self.store.all())
            .map_err(|err| QuoteServiceError::Repo(RepoError::Encode(err)))
    }

    pub fn export_file(&self, path: impl AsRef<Path>) -> ServiceResult<()> {
        fs::write(path, self.export_json()?)?;
        Ok(())
    }

    /// Picks a random quote from the filtered view and records it as last shown.
    pub fn show_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Quote> {
        let visible = self.visible_quotes();
        let quote = random_of(&visible, rng)?.clone();
        if let Err(err) = self.storage.save_last_shown(&quote) {
            warn!("event=last_shown_save module=service status=error error={err}");
        }
        Some(quote)
    }

    pub fn restore_last_shown(&self) -> Option<Quote> {
        self.storage.load_last_shown()
    }

    pub fn set_filter(&mut self, value: &str) -> RepoResult<()> {
        self.index.set_filter(value, &self.storage)
    }

    pub fn current_filter(&self) -> &str {
        self.index.current_filter()
    }

    pub fn categories(&self) -> &[String] {
        self.index.categories()
    }

    /// Quotes eligible for display under the current filter.
    pub fn visible_quotes(&self) -> Vec<Quote> {
        self.store.filtered(self.index.current_filter())
    }

    pub fn filtered(&self, category: &str) -> Vec<Quote> {
        self.store.filtered(category)
    }

    pub fn all(&self) -> &[Quote] {
        self.store.all()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn commit(&mut self, rollback_len: usize) -> RepoResult<()> {
        if let Err(err) = self.storage.save(self.store.all()) {
            warn!("event=quotes_save module=service status=error error={err}");
            self.store.truncate(rollback_len);
            return Err(err);
        }
        self.index.recompute(self.store.all());
        Ok(())
    }
}
