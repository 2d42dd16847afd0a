//! Shared workflow logic behind the CLI subcommands.
//!
//! Keeping this in one place keeps `app` down to dispatch and printing:
//! read -> repair -> write for tables, and validate -> fetch for series.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::cli::{RepairArgs, WindowOpts};
use crate::data::{BatchFetch, BcbClient};
use crate::error::AppError;
use crate::io::ingest::{IngestedTable, read_table};
use crate::io::{export, rules};
use crate::repair::{ColumnRule, RepairOutcome, RuleKind, repair_table};
use crate::window::{DateWindow, SeriesCatalog, WindowValidator};

/// All outputs of a single `sgs repair` run.
#[derive(Debug, Clone)]
pub struct RepairRun {
    pub ingested: IngestedTable,
    pub outcome: RepairOutcome,
    pub output: PathBuf,
}

/// Gather rules from the preset, the rules file and the per-column flags, in
/// that order.
pub fn collect_rules(args: &RepairArgs) -> Result<Vec<ColumnRule>, AppError> {
    let mut out = Vec::new();
    if let Some(preset) = args.preset {
        out.extend(preset.rules());
    }
    if let Some(path) = &args.rules {
        out.extend(rules::load_rules(path)?);
    }
    out.extend(args.date_columns.iter().map(|c| ColumnRule::new(c.as_str(), RuleKind::Date)));
    out.extend(
        args.datetime_columns
            .iter()
            .map(|c| ColumnRule::new(c.as_str(), RuleKind::DateTime)),
    );
    out.extend(args.sentinel_columns.iter().map(|c| {
        ColumnRule::new(
            c.as_str(),
            RuleKind::Sentinel {
                value: args.sentinel_value,
            },
        )
    }));

    if out.is_empty() {
        return Err(AppError::new(
            2,
            "No repair rules given: use --preset, --rules, --date, --datetime or --sentinel.",
        ));
    }
    Ok(out)
}

/// `fact_cub_detalhado.md` -> `fact_cub_detalhado_CORRIGIDO.md`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{stem}_CORRIGIDO.{}", ext.to_string_lossy()),
        None => format!("{stem}_CORRIGIDO"),
    };
    input.with_file_name(name)
}

/// Read, repair and write one export.
pub fn run_repair(args: &RepairArgs) -> Result<RepairRun, AppError> {
    let rules = collect_rules(args)?;
    let ingested = read_table(&args.input, args.delimiter)?;
    if ingested.table.is_empty() {
        return Err(AppError::new(3, format!("No rows in '{}'.", args.input.display())));
    }

    let outcome = repair_table(&ingested.table, &rules);
    if args.strict {
        if let Some(err) = outcome.errors.first() {
            return Err(AppError::from(err.clone()));
        }
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    let delimiter = args.delimiter.resolve(&args.input);
    export::write_table(&output, &outcome.table, delimiter)?;
    info!(path = %output.display(), rows = outcome.table.len(), "repaired table written");

    Ok(RepairRun {
        ingested,
        outcome,
        output,
    })
}

/// Validate one window per requested series against the BCB catalog.
pub fn resolve_windows(opts: &WindowOpts, today: NaiveDate) -> Result<Vec<DateWindow>, AppError> {
    let validator = WindowValidator::new(SeriesCatalog::bcb());
    opts.series
        .iter()
        .map(|id| {
            validator
                .validate_str(*id, opts.start.as_deref(), opts.end.as_deref(), today)
                .map_err(AppError::from)
        })
        .collect()
}

/// Validate every window up front, then fetch them one by one.
pub fn run_fetch(opts: &WindowOpts, today: NaiveDate) -> Result<(Vec<DateWindow>, BatchFetch), AppError> {
    let windows = resolve_windows(opts, today)?;
    let client = BcbClient::from_env()?;
    let batch = client.fetch_many(&windows, today);
    Ok((windows, batch))
}
