//! Similarity scoring for "did you mean" suggestions.
//!
//! Scores are only used to pick suggestions when a search comes back empty; they
//! never influence the order of search results.

use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use super::token::SearchToken;

/// Minimum Jaro-Winkler similarity for a token to be suggested.
pub const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A token close to a fragment that matched nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Suggestion<'a> {
    pub token: &'a SearchToken,
    /// Similarity in `0.0..=1.0`, higher is closer
    pub score: f64,
}

/// Scores every token against an already-normalized fragment and keeps the best
/// `limit` above [`SUGGESTION_THRESHOLD`].
///
/// Tokens must arrive in ascending order; the stable sort keeps that order among
/// equal scores.
pub(crate) fn rank_suggestions<'a>(
    normalized_fragment: &str,
    tokens: impl Iterator<Item = &'a SearchToken>,
    limit: usize,
) -> Vec<Suggestion<'a>> {
    if normalized_fragment.is_empty() || limit == 0 {
        return vec![];
    }

    let mut suggestions: Vec<_> = tokens
        .map(|token| Suggestion {
            token,
            score: jaro_winkler::similarity(normalized_fragment.chars(), token.as_str().chars()),
        })
        .filter(|suggestion| suggestion.score > SUGGESTION_THRESHOLD)
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    suggestions.truncate(limit);
    suggestions
}
