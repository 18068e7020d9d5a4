//! Symbol search and lookup handlers.

use crate::{format, service::SearchService};
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchSymbolsRequest {
    /// Name fragment as typed, e.g. "pack" or "Halo::pack"
    pub query: String,
    /// Maximum number of records to show (default: 50)
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,
}

fn default_limit() -> Option<usize> {
    Some(50)
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupSymbolRequest {
    /// Exact search token; normalized before lookup
    pub token: String,
}

/// Runs an incremental search against the published index.
pub async fn handle_search_symbols(
    service: &Arc<SearchService>,
    request: SearchSymbolsRequest,
) -> Result<String, String> {
    let outcome = service
        .search(&request.query)
        .await
        .map_err(|e| e.to_string())?;

    let limit = request.limit.unwrap_or(50);
    Ok(format::render_results(
        &request.query,
        &outcome.records,
        limit,
        &outcome.suggestions,
    ))
}

pub async fn handle_lookup_symbol(
    service: &Arc<SearchService>,
    request: LookupSymbolRequest,
) -> Result<String, String> {
    let records = service
        .lookup(&request.token)
        .await
        .map_err(|e| e.to_string())?;
    Ok(format::render_entry(&request.token, &records))
}
