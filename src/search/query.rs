//! Incremental symbol search over an [`IndexStore`].
//!
//! The engine is stateless: it borrows a store, normalizes the fragment the same way
//! the store normalized its keys, and walks the keys in ascending order. Results are
//! the concatenation of every matching token's records, each token's records in
//! emission order, so overloads of one symbol always stay adjacent.

use serde::{Deserialize, Serialize};

use super::index::IndexStore;
use super::record::SymbolRecord;
use super::scoring::{Suggestion, rank_suggestions};
use super::token::{SearchToken, normalize};

/// How a fragment is matched against tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Token contains the fragment anywhere (`pack` finds `unpackbuffer`)
    #[default]
    Substring,
    /// Token starts with the fragment
    Prefix,
}

/// The records of one matching token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenGroup<'a> {
    pub token: &'a SearchToken,
    pub records: &'a [SymbolRecord],
}

/// Read-only query front end over a borrowed store.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    store: &'a IndexStore,
    mode: MatchMode,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a IndexStore) -> Self {
        Self {
            store,
            mode: MatchMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Matching tokens in ascending order, each with its records.
    ///
    /// An empty fragment, or one with nothing searchable in it, matches nothing.
    pub fn search_grouped(&self, fragment: &str) -> Vec<TokenGroup<'a>> {
        let needle = normalize(fragment);
        if needle.is_empty() {
            return vec![];
        }

        let groups: Vec<_> = match self.mode {
            MatchMode::Substring => self
                .store
                .entries()
                .filter(|(token, _)| token.contains(&needle))
                .map(|(token, records)| TokenGroup { token, records })
                .collect(),
            MatchMode::Prefix => self
                .store
                .entries_with_prefix(&needle)
                .map(|(token, records)| TokenGroup { token, records })
                .collect(),
        };

        tracing::trace!(
            "Query '{}' ({:?}) matched {} tokens",
            needle,
            self.mode,
            groups.len()
        );

        groups
    }

    /// Flat result list: every matching token's records, concatenated.
    pub fn search(&self, fragment: &str) -> Vec<&'a SymbolRecord> {
        self.search_grouped(fragment)
            .into_iter()
            .flat_map(|group| group.records)
            .collect()
    }

    /// Tokens similar to `fragment`, best first; meant for empty result lists.
    pub fn suggest(&self, fragment: &str, limit: usize) -> Vec<Suggestion<'a>> {
        rank_suggestions(&normalize(fragment), self.store.tokens(), limit)
    }
}
