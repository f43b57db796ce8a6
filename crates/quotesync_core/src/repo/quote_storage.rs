//! Quote persistence gateway.
//!
//! # Responsibility
//! - Load/save the quote collection and selected filter from durable storage.
//! - Read/write the last shown quote in the session-scoped slot.
//!
//! # Invariants
//! - `load` never fails; unreadable or undecodable state means "no prior save".
//! - Durable and session state live in separate stores.
//! - Quote text is never written to logs.

use crate::model::quote::{seed_quotes, Quote, ALL_CATEGORIES};
use crate::repo::kv_repo::{KeyValueStore, RepoResult};
use log::{info, warn};

pub const QUOTES_KEY: &str = "quotes";
pub const FILTER_KEY: &str = "selectedCategory";
pub const LAST_SHOWN_KEY: &str = "lastQuote";

/// Gateway over a durable store and a session store.
pub struct QuoteStorage<D: KeyValueStore, S: KeyValueStore> {
    durable: D,
    session: S,
}

impl<D: KeyValueStore, S: KeyValueStore> QuoteStorage<D, S> {
    pub fn new(durable: D, session: S) -> Self {
        Self { durable, session }
    }

    /// Returns the saved collection, or the seed collection.
    pub fn load(&self) -> Vec<Quote> {
        let raw = match self.durable.get(QUOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=quotes_load module=storage status=ok source=seed");
                return seed_quotes();
            }
            Err(err) => {
                warn!(
                    "event=quotes_load module=storage status=error error_code=read_failed error={err}"
                );
                return seed_quotes();
            }
        };

        match decode_quotes(&raw) {
            Some(quotes) => {
                info!(
                    "event=quotes_load module=storage status=ok source=saved count={}",
                    quotes.len()
                );
                quotes
            }
            None => {
                warn!("event=quotes_load module=storage status=error error_code=decode_failed source=seed");
                seed_quotes()
            }
        }
    }

    /// Serializes and stores the full collection.
    pub fn save(&self, quotes: &[Quote]) -> RepoResult<()> {
        let raw = serde_json::to_string(quotes)?;
        self.durable.set(QUOTES_KEY, &raw)
    }

    /// Returns the persisted filter, defaulting to `"all"`.
    pub fn load_filter(&self) -> String {
        match self.durable.get(FILTER_KEY) {
            Ok(Some(value)) if !value.trim().is_empty() => value,
            Ok(_) => ALL_CATEGORIES.to_string(),
            Err(err) => {
                warn!(
                    "event=filter_load module=storage status=error error_code=read_failed error={err}"
                );
                ALL_CATEGORIES.to_string()
            }
        }
    }

    pub fn save_filter(&self, value: &str) -> RepoResult<()> {
        self.durable.set(FILTER_KEY, value)
    }

    /// Returns the last shown quote for this session, if any.
    pub fn load_last_shown(&self) -> Option<Quote> {
        let raw = self.session.get(LAST_SHOWN_KEY).ok().flatten()?;
        serde_json::from_str::<Quote>(&raw).ok()
    }

    pub fn save_last_shown(&self, quote: &Quote) -> RepoResult<()> {
        let raw = serde_json::to_string(quote)?;
        self.session.set(LAST_SHOWN_KEY, &raw)
    }
}

fn decode_quotes(raw: &str) -> Option<Vec<Quote>> {
    serde_json::from_str::<Vec<Quote>>(raw).ok()
}
