//! Reporting utilities: repair summaries, windows and fetch results.

pub mod format;

pub use format::{format_fetch_summary, format_repair_summary, format_window};
