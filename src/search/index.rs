//! Immutable symbol index keyed by normalized search token.

use crate::error::MalformedIndex;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::{collections::BTreeMap, ops::Bound, time::Instant};

use super::record::{IndexTable, SymbolRecord, overload_groups};
use super::token::{SearchToken, normalize};

/// A validated, read-only symbol index.
///
/// [`IndexStore::build`] is the only way to obtain one, so every store in existence
/// satisfies the index invariants: non-empty unique tokens and non-empty anchors.
/// Entries are kept in ascending token order.
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    entries: BTreeMap<SearchToken, Vec<SymbolRecord>>,
    record_count: usize,
}

/// Summary counts over an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub tokens: usize,
    pub records: usize,
    /// Distinct labels
    pub labels: usize,
    /// Distinct non-empty scopes
    pub scopes: usize,
    /// Records that share label and scope with at least one other record
    pub overloads: usize,
}

impl IndexStore {
    /// Builds a store from a serialized table, normalizing every key.
    ///
    /// Fails on the first invariant violation; the partially built map is dropped.
    pub fn build(table: IndexTable) -> Result<Self, MalformedIndex> {
        let start = Instant::now();
        let mut entries = BTreeMap::new();
        let mut first_seen: AHashMap<SearchToken, usize> = AHashMap::with_capacity(table.len());
        let mut record_count = 0;

        for (position, entry) in table.entries.into_iter().enumerate() {
            let Some(token) = SearchToken::new(&entry.token) else {
                return Err(MalformedIndex::EmptyToken {
                    position,
                    raw: entry.token,
                });
            };

            if let Some(&first) = first_seen.get(&token) {
                return Err(MalformedIndex::DuplicateToken {
                    token: token.into_inner(),
                    first,
                    second: position,
                });
            }

            if let Some(record) = entry
                .records
                .iter()
                .position(|record| record.anchor.trim().is_empty())
            {
                return Err(MalformedIndex::EmptyAnchor {
                    token: token.into_inner(),
                    record,
                });
            }

            if entry.records.is_empty() {
                tracing::debug!("Search token '{}' has no records", token);
            }

            record_count += entry.records.len();
            first_seen.insert(token.clone(), position);
            entries.insert(token, entry.records);
        }

        tracing::info!(
            "Built symbol index: {} tokens, {} records in {:?}",
            entries.len(),
            record_count,
            start.elapsed()
        );

        Ok(Self {
            entries,
            record_count,
        })
    }

    /// Returns the records stored under `token`, or an empty slice.
    ///
    /// The argument is normalized first, so `lookup("packArray")` finds the
    /// `packarray` entry.
    pub fn lookup(&self, token: &str) -> &[SymbolRecord] {
        let normalized = normalize(token);
        self.entries
            .get(normalized.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All entries in ascending token order.
    pub fn entries(&self) -> impl Iterator<Item = (&SearchToken, &[SymbolRecord])> {
        self.entries
            .iter()
            .map(|(token, records)| (token, records.as_slice()))
    }

    /// Entries whose token starts with an already-normalized prefix, in ascending order.
    ///
    /// Yielded entries borrow only the store, so they outlive `prefix`.
    pub(crate) fn entries_with_prefix<'a, 'p>(
        &'a self,
        prefix: &'p str,
    ) -> impl Iterator<Item = (&'a SearchToken, &'a [SymbolRecord])> {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(token, _)| token.starts_with(prefix))
            .map(|(token, records)| (token, records.as_slice()))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &SearchToken> {
        self.entries.keys()
    }

    pub fn token_count(&self) -> usize {
        self.entries.len()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        let mut labels = AHashSet::new();
        let mut scopes = AHashSet::new();
        let mut overloads = 0;

        for records in self.entries.values() {
            for group in overload_groups(records) {
                if group.is_overloaded() {
                    overloads += group.records.len();
                }
            }
            for record in records {
                labels.insert(record.label.as_str());
                if !record.scope.is_empty() {
                    scopes.insert(record.scope.as_str());
                }
            }
        }

        IndexStats {
            tokens: self.entries.len(),
            records: self.record_count,
            labels: labels.len(),
            scopes: scopes.len(),
            overloads,
        }
    }

    /// Serializable form of this store, with normalized keys in ascending order.
    pub fn to_table(&self) -> IndexTable {
        let mut table = IndexTable::default();
        for (token, records) in &self.entries {
            table.push(token.as_str(), records.clone());
        }
        table
    }
}
