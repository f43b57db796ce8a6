//! In-memory quote collection.
//!
//! # Responsibility
//! - Own the authoritative ordered collection of quotes.
//! - Provide append, filter and merge primitives without side effects.
//!
//! # Invariants
//! - Insertion order is preserved; there is no delete.
//! - `merge_remote` never appends a quote whose `text` is already present.
//! - `add` and `replace_all` do not de-duplicate.

use crate::model::quote::{Quote, QuoteValidationError, ALL_CATEGORIES};
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_quotes(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Validates raw input and appends the normalized quote.
    pub fn add(
        &mut self,
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Quote, QuoteValidationError> {
        let quote = Quote::new(text, category)?;
        self.quotes.push(quote.clone());
        Ok(quote)
    }

    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    /// Returns quotes whose category matches verbatim, or all for `"all"`.
    pub fn filtered(&self, category: &str) -> Vec<Quote> {
        if category == ALL_CATEGORIES {
            return self.quotes.clone();
        }
        self.quotes
            .iter()
            .filter(|quote| quote.category() == category)
            .cloned()
            .collect()
    }

    /// Appends candidates whose text is not yet present.
    ///
    /// Returns how many were appended. Duplicates inside `candidates`
    /// collapse to their first occurrence.
    pub fn merge_remote(&mut self, candidates: impl IntoIterator<Item = Quote>) -> usize {
        let mut known: HashSet<String> =
            self.quotes.iter().map(|q| q.text().to_string()).collect();
        let before = self.quotes.len();
        for candidate in candidates {
            if known.insert(candidate.text().to_string()) {
                self.quotes.push(candidate);
            }
        }
        self.quotes.len() - before
    }

    /// Appends every candidate unconditionally.
    pub fn replace_all(&mut self, candidates: impl IntoIterator<Item = Quote>) {
        self.quotes.extend(candidates);
    }

    /// Drops everything appended after the first `len` quotes.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.quotes.truncate(len);
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Quote> {
        random_of(&self.quotes, rng)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Picks one element uniformly at random.
pub fn random_of<'a, R: Rng + ?Sized>(quotes: &'a [Quote], rng: &mut R) -> Option<&'a Quote> {
    if quotes.is_empty() {
        return None;
    }
    quotes.get(rng.gen_range(0..quotes.len()))
}
