//! Symbol records and the serialized index table.

use serde::{Deserialize, Serialize};

/// One documented symbol occurrence.
///
/// Records are never merged: two records with the same label stay distinct even
/// when every field matches, because they come from distinct emissions of the
/// documentation build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Display name, e.g. `packArray`
    pub label: String,
    /// Enclosing namespace or class (`Cajita::Halo`), empty for free functions
    #[serde(default)]
    pub scope: String,
    /// Opaque locator of the documentation page location
    pub anchor: String,
    /// Parameter list distinguishing overloads
    #[serde(default)]
    pub signature: Option<String>,
}

impl SymbolRecord {
    pub fn new(
        label: impl Into<String>,
        scope: impl Into<String>,
        anchor: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            scope: scope.into(),
            anchor: anchor.into(),
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// `scope::label`, or just the label for free functions.
    pub fn qualified_name(&self) -> String {
        if self.scope.is_empty() {
            self.label.clone()
        } else {
            format!("{}::{}", self.scope, self.label)
        }
    }

    /// Whether `other` is an overload of the same symbol (same label and scope).
    pub fn is_overload_of(&self, other: &Self) -> bool {
        self.label == other.label && self.scope == other.scope
    }
}

/// One key of the serialized table with its records in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Raw key; normalized when the store is built
    pub token: String,
    #[serde(default)]
    pub records: Vec<SymbolRecord>,
}

/// The serialized form of an index, as emitted by the documentation build.
///
/// A list rather than a map so that duplicate keys survive deserialization and
/// can be rejected instead of silently overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTable {
    pub entries: Vec<IndexEntry>,
}

impl IndexTable {
    pub fn push(&mut self, token: impl Into<String>, records: Vec<SymbolRecord>) {
        self.entries.push(IndexEntry {
            token: token.into(),
            records,
        });
    }

    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A run of adjacent records sharing label and scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverloadGroup<'a> {
    pub label: &'a str,
    pub scope: &'a str,
    pub records: &'a [SymbolRecord],
}

impl OverloadGroup<'_> {
    pub fn is_overloaded(&self) -> bool {
        self.records.len() > 1
    }
}

/// Splits an entry's records into overload groups without reordering them.
pub fn overload_groups(records: &[SymbolRecord]) -> impl Iterator<Item = OverloadGroup<'_>> {
    records
        .chunk_by(|a, b| a.is_overload_of(b))
        .map(|run| OverloadGroup {
            label: &run[0].label,
            scope: &run[0].scope,
            records: run,
        })
}
