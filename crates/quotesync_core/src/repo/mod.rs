//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract and its SQLite/in-memory backends.
//! - Map the quote collection, filter and last shown quote onto storage keys.
//!
//! # Invariants
//! - Only the quote service writes persisted quote state.

pub mod kv_repo;
pub mod quote_storage;
