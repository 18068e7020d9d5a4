//! Index status and reload handlers.

use crate::{format, service::SearchService};
use std::sync::Arc;

pub async fn handle_index_status(service: &Arc<SearchService>) -> Result<String, String> {
    let config = service.config();
    let sources = if config.sources.is_empty() {
        "(none configured)".to_string()
    } else {
        config
            .sources
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let stats = service.stats().await.map_err(|e| e.to_string())?;
    let mut output = format::render_stats(&stats);
    output.push_str(&format!(
        "  sources:   {}\n  matching:  {:?}\n",
        sources, config.match_mode
    ));
    Ok(output)
}

/// Rebuilds the index when its sources changed on disk.
pub async fn handle_reload_index(service: &Arc<SearchService>) -> Result<String, String> {
    let report = service
        .reload_if_changed()
        .await
        .map_err(|e| format!("Failed to reload symbol index: {:#}", e))?;

    Ok(match report {
        Some(report) => format::render_load_report(&report),
        None => "Index sources unchanged, nothing to reload.\n".to_string(),
    })
}
