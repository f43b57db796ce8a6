//! Remote reconciliation: pull/merge, push and the polling worker.
//!
//! # Responsibility
//! - Keep the local collection converging with a remote mock endpoint.
//! - Never let a remote failure stop polling or roll back local writes.
//!
//! # Invariants
//! - Merge is by exact `text`; remote quotes never replace local ones.

pub mod http_remote;
pub mod reconciler;
pub mod remote;
pub mod worker;
