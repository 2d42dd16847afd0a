//! Column-level repair of malformed spreadsheet exports.
//!
//! Each rule kind lives in its own submodule and works on a single column:
//!
//! - `dates`: spreadsheet serials -> ISO dates / datetimes
//! - `category`: generic codes (`Coluna_0`) -> descriptive labels
//! - `sentinel`: `-100` "no data" markers and garbled numbers -> nulls
//!
//! [`repair_table`] ties them together. It never fails on a bad cell; the
//! only reported problem is a rule whose column does not exist, and even then
//! the remaining rules still run.

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::Table;

pub mod category;
pub mod dates;
pub mod sentinel;

pub use category::{CategoryMap, normalize_token, repair_category};
pub use dates::{SerialFormat, repair_dates, repair_datetimes, serial_to_iso};
pub use sentinel::{DEFAULT_SENTINEL, repair_sentinel};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    #[error("Missing required column: `{0}`")]
    MissingColumn(String),
}

fn default_sentinel() -> f64 {
    DEFAULT_SENTINEL
}

/// How a single column should be repaired.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuleKind {
    /// Serial -> `YYYY-MM-DD` (with time when the serial has a fraction).
    Date,
    /// Serial -> `YYYY-MM-DD HH:MM:SS`.
    DateTime,
    Category { mapping: CategoryMap },
    Sentinel {
        #[serde(default = "default_sentinel")]
        value: f64,
    },
}

impl RuleKind {
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::Date => "date",
            RuleKind::DateTime => "datetime",
            RuleKind::Category { .. } => "category",
            RuleKind::Sentinel { .. } => "sentinel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnRule {
    pub column: String,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl ColumnRule {
    pub fn new(column: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            column: column.into(),
            kind,
        }
    }
}

/// Built-in rule sets for exports we repair regularly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// `fact_cub_detalhado`: CUB per state, exported with serial dates,
    /// `Coluna_N` type codes and `-100` gaps.
    CubDetalhado,
}

impl Preset {
    pub fn rules(self) -> Vec<ColumnRule> {
        match self {
            Preset::CubDetalhado => vec![
                ColumnRule::new("data_referencia", RuleKind::Date),
                ColumnRule::new(
                    "tipo_cub",
                    RuleKind::Category {
                        mapping: CategoryMap::new([
                            ("Coluna_0", "CUB-medio"),
                            ("Coluna_1", "Variacao_mensal_%"),
                            ("Coluna_2", "Variacao_12meses_%"),
                            ("Coluna_3", "Variacao_ano_%"),
                        ]),
                    },
                ),
                ColumnRule::new(
                    "valor",
                    RuleKind::Sentinel {
                        value: DEFAULT_SENTINEL,
                    },
                ),
                ColumnRule::new("created_at", RuleKind::DateTime),
            ],
        }
    }
}

/// Per-pass cell counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Cells rewritten (serial converted, code mapped, number parsed).
    pub converted: usize,
    /// Non-null cells left exactly as they were.
    pub untouched: usize,
    /// Cells nulled because they held the sentinel.
    pub sentinels: usize,
    /// Cells nulled because they did not parse.
    pub coerced: usize,
}

/// What one rule did to its column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub kind: &'static str,
    pub stats: PassStats,
    pub nulls_before: usize,
    pub nulls_after: usize,
}

/// Repaired table plus what happened along the way.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub table: Table,
    pub summaries: Vec<ColumnSummary>,
    pub errors: Vec<RepairError>,
}

impl RepairOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Apply `rules` to a copy of `table`.
///
/// Row count, row order and the column set are preserved; rows whose every
/// cell ends up null are kept. Rules run in order, so two rules on the same
/// column compose.
pub fn repair_table(table: &Table, rules: &[ColumnRule]) -> RepairOutcome {
    let mut repaired = table.clone();
    let mut summaries = Vec::with_capacity(rules.len());
    let mut errors = Vec::new();

    for rule in rules {
        let Some(idx) = repaired.column_index(&rule.column) else {
            warn!(column = %rule.column, kind = rule.kind.label(), "column not found; rule skipped");
            errors.push(RepairError::MissingColumn(rule.column.clone()));
            continue;
        };

        let nulls_before = repaired.null_count(idx);
        let column = repaired.column(idx);
        let (cells, stats) = match &rule.kind {
            RuleKind::Date => dates::convert_column(&column, SerialFormat::Auto),
            RuleKind::DateTime => dates::convert_column(&column, SerialFormat::DateTime),
            RuleKind::Category { mapping } => category::map_column(&column, mapping),
            RuleKind::Sentinel { value } => sentinel::null_sentinels(&column, *value),
        };
        repaired.set_column(idx, cells);
        let nulls_after = repaired.null_count(idx);

        info!(
            column = %rule.column,
            kind = rule.kind.label(),
            converted = stats.converted,
            untouched = stats.untouched,
            sentinels = stats.sentinels,
            coerced = stats.coerced,
            nulls = nulls_after,
            "column repaired"
        );

        summaries.push(ColumnSummary {
            column: rule.column.clone(),
            kind: rule.kind.label(),
            stats,
            nulls_before,
            nulls_after,
        });
    }

    RepairOutcome {
        table: repaired,
        summaries,
        errors,
    }
}

/// Parse a number written with either `.` or `,` as decimal separator.
///
/// Non-finite results (`inf`, `NaN`) count as unparseable.
pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    let v = normalized.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
