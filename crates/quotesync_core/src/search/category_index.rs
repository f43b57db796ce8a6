//! Category index derived from the quote collection.
//!
//! # Responsibility
//! - Maintain the distinct category list shown by filter pickers.
//! - Hold the selected filter and persist changes immediately.
//!
//! # Invariants
//! - `categories()[0]` is always the `"all"` sentinel.
//! - Remaining entries are distinct, in first-seen order.
//! - A selected filter matching no category is kept as-is.

use crate::model::quote::{normalize_category, Quote, ALL_CATEGORIES};
use crate::repo::kv_repo::{KeyValueStore, RepoResult};
use crate::repo::quote_storage::QuoteStorage;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryIndex {
    categories: Vec<String>,
    selected: String,
}

impl Default for CategoryIndex {
    fn default() -> Self {
        Self {
            categories: vec![ALL_CATEGORIES.to_string()],
            selected: ALL_CATEGORIES.to_string(),
        }
    }
}

impl CategoryIndex {
    pub fn new(selected: impl Into<String>) -> Self {
        Self {
            selected: selected.into(),
            ..Self::default()
        }
    }

    /// Rebuilds the category list from the current collection.
    pub fn recompute(&mut self, quotes: &[Quote]) -> &[String] {
        let mut seen = HashSet::new();
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for quote in quotes {
            if seen.insert(quote.category()) {
                categories.push(quote.category().to_string());
            }
        }
        self.categories = categories;
        &self.categories
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn current_filter(&self) -> &str {
        &self.selected
    }

    /// Persists and then selects `value`; blank input selects `"all"`.
    pub fn set_filter<D: KeyValueStore, S: KeyValueStore>(
        &mut self,
        value: &str,
        storage: &QuoteStorage<D, S>,
    ) -> RepoResult<()> {
        let mut normalized = normalize_category(value);
        if normalized.is_empty() {
            normalized = ALL_CATEGORIES.to_string();
        }
        storage.save_filter(&normalized)?;
        self.selected = normalized;
        Ok(())
    }
}
