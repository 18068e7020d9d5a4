//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for symsearch application glue.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` where errors cross into the CLI and server layers.
pub type Result<T> = anyhow::Result<T>;

/// An index table that violates the index invariants.
///
/// Raised only while building an [`IndexStore`](crate::search::IndexStore); a table
/// that produces this error never yields a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedIndex {
    /// The key normalizes to an empty token.
    #[error("entry {position} has an empty search token (raw key {raw:?})")]
    EmptyToken { position: usize, raw: String },
    /// Two entries normalize to the same token.
    #[error("search token '{token}' appears more than once (entries {first} and {second})")]
    DuplicateToken {
        token: String,
        first: usize,
        second: usize,
    },
    /// A record has no anchor to link to.
    #[error("record {record} under search token '{token}' has an empty anchor")]
    EmptyAnchor { token: String, record: usize },
}

/// Errors surfaced by the search service to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// No index has been published yet.
    #[error("Symbol index is not loaded")]
    IndexUnavailable,
}

/// Errors raised while reading documentation build output.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("source path does not exist: {}", path.display())]
    Missing { path: PathBuf },
    #[error("cannot tell the index format of {} (expected .js or .json)", path.display())]
    UnknownFormat { path: PathBuf },
    #[error("invalid JSON index table in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid Doxygen search data in {}: {source}", path.display())]
    Doxygen {
        path: PathBuf,
        #[source]
        source: crate::source::doxygen::DoxygenError,
    },
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Errors raised while reading or writing a compiled snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] postcard::Error),
    #[error("snapshot format version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
}
