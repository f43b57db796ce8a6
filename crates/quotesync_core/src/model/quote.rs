//! Quote domain model.
//!
//! # Responsibility
//! - Define the `{text, category}` record and its JSON shape.
//! - Normalize and validate raw input at the point a quote is created.
//!
//! # Invariants
//! - `text` and `category` are trimmed and non-empty.
//! - Internal whitespace runs in `category` collapse to one space.
//! - Case is preserved for both fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sentinel filter value that selects every quote.
pub const ALL_CATEGORIES: &str = "all";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const SEED_QUOTES: &[(&str, &str)] = &[
    (
        "The only limit to our realization of tomorrow is our doubts of today.",
        "Motivation",
    ),
    ("In the middle of difficulty lies opportunity.", "Inspiration"),
    (
        "Life is 10% what happens to us and 90% how we react to it.",
        "Life",
    ),
];

/// Validation failure for quote input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText,
    EmptyCategory,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
            Self::EmptyCategory => write!(f, "quote category cannot be empty"),
        }
    }
}

impl Error for QuoteValidationError {}

/// Canonical quote record.
///
/// Fields are private so every instance, including deserialized ones, has
/// passed through [`Quote::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "QuoteRecord")]
pub struct Quote {
    text: String,
    category: String,
}

/// Wire shape accepted before validation.
#[derive(Deserialize)]
struct QuoteRecord {
    text: String,
    category: String,
}

impl TryFrom<QuoteRecord> for Quote {
    type Error = QuoteValidationError;

    fn try_from(record: QuoteRecord) -> Result<Self, Self::Error> {
        Quote::new(record.text, record.category)
    }
}

impl Quote {
    /// Creates a quote from raw user or remote input.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank after trimming.
    /// - `EmptyCategory` when `category` is blank after trimming.
    pub fn new(
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuoteValidationError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        let category = normalize_category(category.as_ref());
        if category.is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }

        Ok(Self {
            text: text.to_string(),
            category,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns whether this quote shares identity with `other`.
    pub fn same_text(&self, other: &Quote) -> bool {
        self.text == other.text
    }
}

/// Trims and collapses whitespace in a category value.
pub fn normalize_category(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Returns the collection used when nothing has been saved yet.
pub fn seed_quotes() -> Vec<Quote> {
    SEED_QUOTES
        .iter()
        .map(|(text, category)| Quote {
            text: (*text).to_string(),
            category: (*category).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_category, seed_quotes, Quote, QuoteValidationError};

    #[test]
    fn new_trims_text_and_collapses_category_whitespace() {
        let quote = Quote::new("  Stay hungry  ", "  Daily \t  Life ").unwrap();
        assert_eq!(quote.text(), "Stay hungry");
        assert_eq!(quote.category(), "Daily Life");
    }

    #[test]
    fn new_preserves_case() {
        let quote = Quote::new("Stay Hungry", "Motivation").unwrap();
        assert_eq!(quote.category(), "Motivation");
        assert_eq!(normalize_category("SERVER"), "SERVER");
    }

    #[test]
    fn new_rejects_blank_fields() {
        assert_eq!(
            Quote::new("   ", "life").unwrap_err(),
            QuoteValidationError::EmptyText
        );
        assert_eq!(
            Quote::new("text", "\n").unwrap_err(),
            QuoteValidationError::EmptyCategory
        );
    }

    #[test]
    fn serializes_as_text_and_category_object() {
        let quote = Quote::new("a", "b").unwrap();
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json, serde_json::json!({"text": "a", "category": "b"}));
    }

    #[test]
    fn seed_quotes_are_valid() {
        let seeds = seed_quotes();
        assert_eq!(seeds.len(), 3);
        for seed in seeds {
            assert_eq!(Quote::new(seed.text(), seed.category()).unwrap(), seed);
        }
    }

    #[test]
    fn deserialization_applies_creation_policy() {
        let quote: Quote =
            serde_json::from_str(r#"{"text":"  padded ","category":" Daily   Life "}"#).unwrap();
        assert_eq!(quote, Quote::new("padded", "Daily Life").unwrap());

        let err = serde_json::from_str::<Quote>(r#"{"text":"   ","category":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("quote text cannot be empty"));
        assert!(serde_json::from_str::<Vec<Quote>>(r#"[{"text":"a","category":""}]"#).is_err());
    }
}
