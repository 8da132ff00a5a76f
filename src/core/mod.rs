//! In-memory authoritative store and index helpers.

/// Unique index helpers.
pub mod indices;
/// Authoritative entity store with integrity rules and pending changes.
pub mod store;
/// Per-type row table.
pub mod table;
