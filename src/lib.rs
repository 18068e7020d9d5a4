//! Incremental search over documented symbols.
//!
//! Documentation builds emit an index of search tokens, each mapping to the
//! symbols whose names produce it. [`IndexStore`] validates and holds that index;
//! [`QueryEngine`] finds every token containing a typed fragment and returns their
//! records in a stable order. [`SearchService`] publishes a store for concurrent
//! readers and keeps it current as the documentation is regenerated.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod schema;
pub mod search;
pub mod server;
pub mod service;
pub mod snapshot;
pub mod source;
pub mod tools;
pub mod tracing;

pub use config::Config;
pub use error::{MalformedIndex, Result, SearchError};
pub use search::{IndexStore, IndexTable, MatchMode, QueryEngine, SearchToken, SymbolRecord};
pub use service::{SearchService, spawn_reload_worker};
