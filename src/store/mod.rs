//! Shared mutable state: stored image bytes and the alias table.
//!
//! Both are injected as trait objects so the resolver and exporter can run against the
//! in-memory implementations in tests and the filesystem ones in the binary.

/// Alias (static link) records, storage trait and implementations.
pub mod alias;
/// Blob store trait and the in-memory implementation.
pub mod blob;
/// Name-validating content store over a blob store.
pub mod content;
/// Filesystem-backed blob and alias stores.
pub mod fs;
