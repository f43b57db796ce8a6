//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory quote collection.
//! - Orchestrate persistence and category refresh into use-case level APIs.

pub mod quote_service;
pub mod quote_store;
