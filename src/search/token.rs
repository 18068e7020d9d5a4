//! Search token normalization.
//!
//! Index keys and user-typed fragments go through the same [`normalize`] function, so
//! case and punctuation differences between what the user types and the documented
//! label never cause a miss.

use serde::Serialize;
use std::{borrow::Borrow, fmt};

/// A normalized, non-empty index key.
///
/// Ordering is plain string ordering, which is the order matching tokens are
/// reported in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchToken(String);

impl SearchToken {
    /// Normalizes `text` into a token. Returns `None` when nothing searchable remains
    /// (empty input, or input made only of punctuation and whitespace).
    pub fn new(text: &str) -> Option<Self> {
        let normalized = normalize(text);
        (!normalized.is_empty()).then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this token contains an already-normalized fragment.
    pub fn contains(&self, normalized_fragment: &str) -> bool {
        self.0.contains(normalized_fragment)
    }

    /// Whether this token starts with an already-normalized fragment.
    pub fn starts_with(&self, normalized_fragment: &str) -> bool {
        self.0.starts_with(normalized_fragment)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Borrow<str> for SearchToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SearchToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases `text` and strips everything that is not alphanumeric.
///
/// - `"packArray"` → `"packarray"`
/// - `"pack_array"` → `"packarray"`
/// - `"Cajita::Halo"` → `"cajitahalo"`
/// - `"operator()"` → `"operator"`
///
/// Lowercasing happens before filtering because some uppercase letters lower into
/// a letter plus a combining mark; filtering afterwards keeps the function idempotent.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
