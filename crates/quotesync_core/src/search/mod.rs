//! Derived lookup views over the quote collection.
//!
//! # Responsibility
//! - Keep filter-picker state (distinct categories + selection) in core.

pub mod category_index;
