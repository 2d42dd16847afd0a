//! Formatted terminal output.
//!
//! Formatting lives here so the repair and window code stay free of
//! presentation concerns, and output changes stay localized.

use crate::data::{BatchFetch, series_name};
use crate::io::ingest::IngestedTable;
use crate::repair::RepairOutcome;
use crate::window::DateWindow;

/// Summary of a `sgs repair` run: per-column counters plus problems.
pub fn format_repair_summary(ingested: &IngestedTable, outcome: &RepairOutcome) -> String {
    let mut out = String::new();
    let table = &outcome.table;

    out.push_str("=== sgs - table repair ===\n");
    out.push_str(&format!(
        "Rows: read={} kept={} rejected={} | columns={}\n",
        ingested.rows_read,
        table.len(),
        ingested.row_errors.len(),
        table.columns().len()
    ));

    if !outcome.summaries.is_empty() {
        out.push_str("\nColumns:\n");
        out.push_str(&format!(
            "{:<20} {:<9} {:>9} {:>9} {:>9} {:>9} {:>12}\n",
            "column", "rule", "converted", "untouched", "sentinel", "coerced", "nulls"
        ));
        for s in &outcome.summaries {
            out.push_str(&format!(
                "{:<20} {:<9} {:>9} {:>9} {:>9} {:>9} {:>12}\n",
                truncate(&s.column, 20),
                s.kind,
                s.stats.converted,
                s.stats.untouched,
                s.stats.sentinels,
                s.stats.coerced,
                format!("{} ({})", s.nulls_after, pct(s.nulls_after, table.len())),
            ));
        }
    }

    if !outcome.errors.is_empty() {
        out.push_str("\nProblems:\n");
        for err in &outcome.errors {
            out.push_str(&format!("- {err}\n"));
        }
    }

    if !ingested.row_errors.is_empty() {
        out.push_str("\nRejected rows:\n");
        for e in ingested.row_errors.iter().take(10) {
            out.push_str(&format!("- line {}: {}\n", e.line, e.message));
        }
        if ingested.row_errors.len() > 10 {
            out.push_str(&format!("  ... and {} more\n", ingested.row_errors.len() - 10));
        }
    }

    out
}

/// One line per window, plus indented notices.
pub fn format_window(window: &DateWindow) -> String {
    let mut out = format!(
        "series {} ({}): {} -> {}\n",
        window.series,
        window.cadence.display_name(),
        window.start_str(),
        window.end_str()
    );
    for notice in &window.notices {
        out.push_str(&format!("  note: {notice}\n"));
    }
    out
}

pub fn format_fetch_summary(batch: &BatchFetch) -> String {
    let mut out = String::new();
    out.push_str("=== sgs - series fetch ===\n");
    for fetched in &batch.fetched {
        let id = fetched.window.series;
        let name = series_name(id).unwrap_or("-");
        let first = fetched.points.iter().map(|p| p.date).min();
        let last = fetched.points.iter().map(|p| p.date).max();
        match (first, last) {
            (Some(first), Some(last)) => out.push_str(&format!(
                "{:>6}  {:<45} n={:<5} {first} .. {last}\n",
                id.to_string(),
                truncate(name, 45),
                fetched.points.len(),
            )),
            _ => out.push_str(&format!(
                "{:>6}  {:<45} n=0 (empty window)\n",
                id.to_string(),
                truncate(name, 45)
            )),
        }
    }
    for (id, err) in &batch.failed {
        out.push_str(&format!("{:>6}  FAILED: {err}\n", id.to_string()));
    }
    out
}

fn pct(part: usize, total: usize) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('~');
    t
}
