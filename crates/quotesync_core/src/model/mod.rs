//! Domain model for quote records.
//!
//! # Responsibility
//! - Define the single domain entity (`Quote`) shared by store, storage and sync.
//! - Own the creation-boundary normalization policy.
//!
//! # Invariants
//! - A `Quote` built through `Quote::new` always has non-empty `text` and `category`.
//! - Identity for de-duplication is exact, case-sensitive `text` equality.

pub mod quote;
