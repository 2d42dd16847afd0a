//! Command-line parsing for the `sgs` tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! repair and window logic; dispatch lives in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::SeriesId;
use crate::io::ingest::Delimiter;
use crate::repair::{DEFAULT_SENTINEL, Preset};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sgs", version, about = "Spreadsheet export repair and SGS date-window tools")]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace). Falls back to SGS_LOG_LEVEL.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Repair serial dates, category codes and sentinels in a delimited export.
    Repair(RepairArgs),
    /// Print the effective fetch window for one or more SGS series.
    Window(WindowArgs),
    /// Validate windows and fetch SGS series from the Banco Central API.
    Fetch(FetchArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RepairArgs {
    /// Input file (TSV/CSV).
    pub input: PathBuf,

    /// Output file. Defaults to `<input stem>_CORRIGIDO.<ext>` next to the input.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Field delimiter for both input and output.
    #[arg(long, value_enum, default_value_t = Delimiter::Auto)]
    pub delimiter: Delimiter,

    /// Built-in rule set.
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// JSON file with extra column rules.
    #[arg(long, value_name = "JSON")]
    pub rules: Option<PathBuf>,

    /// Column holding serial dates (repeatable).
    #[arg(long = "date", value_name = "COLUMN")]
    pub date_columns: Vec<String>,

    /// Column holding serial timestamps, always written with a time (repeatable).
    #[arg(long = "datetime", value_name = "COLUMN")]
    pub datetime_columns: Vec<String>,

    /// Measurement column whose sentinel cells become null (repeatable).
    #[arg(long = "sentinel", value_name = "COLUMN")]
    pub sentinel_columns: Vec<String>,

    /// Sentinel value used by `--sentinel` columns.
    #[arg(long, default_value_t = DEFAULT_SENTINEL, allow_negative_numbers = true)]
    pub sentinel_value: f64,

    /// Exit with an error when a rule names a column the file does not have.
    #[arg(long)]
    pub strict: bool,
}

/// Window options shared by `window` and `fetch`.
#[derive(Debug, Args, Clone)]
pub struct WindowOpts {
    /// SGS series codes (e.g. 433 for IPCA).
    #[arg(required = true, value_name = "SERIES")]
    pub series: Vec<SeriesId>,

    /// Start date (DD/MM/YYYY). Defaults to 12 months before the end.
    #[arg(long)]
    pub start: Option<String>,

    /// End date (DD/MM/YYYY). Defaults to, and is clamped to, the latest available date.
    #[arg(long)]
    pub end: Option<String>,

    /// Override "today" (YYYY-MM-DD); useful for reproducing past runs.
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct WindowArgs {
    #[command(flatten)]
    pub window: WindowOpts,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub window: WindowOpts,

    /// Export fetched points to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Add daily/monthly/yearly percent changes to the export.
    #[arg(long)]
    pub variations: bool,
}
