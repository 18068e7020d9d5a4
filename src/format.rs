//! Plain-text rendering of search results for the CLI and MCP tools.

use crate::search::{IndexStats, SymbolRecord, overload_groups};
use crate::service::LoadReport;
use std::fmt::Write as _;

/// Renders search results, capped at `limit` records.
///
/// Consecutive overloads are shown under one heading so `packArray(int)` and
/// `packArray(long)` read as one symbol.
pub fn render_results(
    fragment: &str,
    records: &[SymbolRecord],
    limit: usize,
    suggestions: &[String],
) -> String {
    if records.is_empty() {
        return render_no_results(fragment, suggestions);
    }

    let shown = &records[..records.len().min(limit)];
    let mut output = format!(
        "{} result{} for '{}':\n\n",
        records.len(),
        if records.len() == 1 { "" } else { "s" },
        fragment
    );

    for group in overload_groups(shown) {
        let name = group.records[0].qualified_name();
        if group.is_overloaded() {
            let _ = writeln!(output, "• `{}` ({} overloads)", name, group.records.len());
            for record in group.records {
                let _ = writeln!(
                    output,
                    "    {}  {}",
                    record.signature.as_deref().unwrap_or("()"),
                    record.anchor
                );
            }
        } else {
            let record = &group.records[0];
            let _ = writeln!(
                output,
                "• `{}{}`  {}",
                name,
                record.signature.as_deref().unwrap_or(""),
                record.anchor
            );
        }
    }

    if shown.len() < records.len() {
        let _ = writeln!(
            output,
            "\n… {} more not shown (raise the limit to see them)",
            records.len() - shown.len()
        );
    }

    output
}

/// Message for a query that matched nothing.
pub fn render_no_results(fragment: &str, suggestions: &[String]) -> String {
    let mut output = format!("No symbols found for '{}'.\n", fragment);
    if !suggestions.is_empty() {
        output.push_str("\nDid you mean:\n");
        for suggestion in suggestions {
            let _ = writeln!(output, "• `{}`", suggestion);
        }
    }
    output
}

/// Renders every record of one exact entry.
pub fn render_entry(token: &str, records: &[SymbolRecord]) -> String {
    if records.is_empty() {
        return format!("No entry for '{}'.\n", token);
    }

    let mut output = format!("Entry '{}' ({} records):\n\n", token, records.len());
    for (idx, record) in records.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. `{}{}`  {}",
            idx + 1,
            record.qualified_name(),
            record.signature.as_deref().unwrap_or(""),
            record.anchor
        );
    }
    output
}

pub fn render_stats(stats: &IndexStats) -> String {
    let mut output = String::from("Symbol index:\n");
    let _ = writeln!(output, "  tokens:    {}", stats.tokens);
    let _ = writeln!(output, "  records:   {}", stats.records);
    let _ = writeln!(output, "  labels:    {}", stats.labels);
    let _ = writeln!(output, "  scopes:    {}", stats.scopes);
    let _ = writeln!(output, "  overloads: {}", stats.overloads);
    output
}

pub fn render_load_report(report: &LoadReport) -> String {
    format!(
        "Loaded {} tokens ({} records) from {} source file{}{} in {:.1?}\n",
        report.tokens,
        report.records,
        report.source_files,
        if report.source_files == 1 { "" } else { "s" },
        if report.from_snapshot { " via snapshot" } else { "" },
        report.elapsed
    )
}
