//! Symbol index and incremental search.
//!
//! This module provides token normalization, the immutable index store, and the
//! query engine a search box runs against it on every keystroke.

// Module declarations
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod record;
pub(crate) mod scoring;
pub(crate) mod token;

// Public re-exports (used via lib.rs)
pub use index::{IndexStats, IndexStore};
pub use query::{MatchMode, QueryEngine, TokenGroup};
pub use record::{IndexEntry, IndexTable, OverloadGroup, SymbolRecord, overload_groups};
pub use scoring::{SUGGESTION_THRESHOLD, Suggestion};
pub use token::{SearchToken, normalize};
