//! Shared domain types.
//!
//! These types are intentionally small and owned so that every repair or
//! validation step can hand back a fresh value without touching its input:
//!
//! - raw and repaired spreadsheet exports (`Table`, `Cell`)
//! - SGS series identifiers and their publication cadence (`SeriesId`, `Cadence`)

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single raw or repaired cell.
///
/// `Missing` is the null marker. It is written back out as an empty field,
/// never as a literal `nan` or `null` string.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Missing,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Build a cell from a raw text field: blank fields become `Missing`.
    pub fn from_field(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Missing
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => f.write_str(&format_number(*v)),
        }
    }
}

/// Render a float the way spreadsheet tooling expects: integral values keep
/// one decimal (`-99.0`), everything else uses the shortest exact form.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Duplicate column name `{0}`.")]
    DuplicateColumn(String),

    #[error("Row {row} has {found} cells, expected {expected}.")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// An ordered, rectangular table of cells.
///
/// Invariants: column names are unique and every row holds exactly one cell
/// per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy out one column, top to bottom.
    pub fn column(&self, idx: usize) -> Vec<Cell> {
        self.rows.iter().map(|row| row[idx].clone()).collect()
    }

    /// Overwrite one column. `cells` must have one entry per row.
    pub(crate) fn set_column(&mut self, idx: usize, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows.len());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row[idx] = cell;
        }
    }

    pub fn null_count(&self, idx: usize) -> usize {
        self.rows.iter().filter(|row| row[idx].is_missing()).count()
    }
}

/// Numeric code of a Banco Central SGS time series (e.g. `433` for IPCA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub u32);

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeriesId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the prefixed form used in the fact tables too.
        let s = s.trim();
        let digits = s.strip_prefix("BCB_SGS_").unwrap_or(s);
        digits
            .parse::<u32>()
            .map(SeriesId)
            .map_err(|_| format!("Invalid SGS series id '{s}' (expected a positive integer)."))
    }
}

/// Expected publication frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// Values appear the next business day (D+1).
    Daily,
    /// Values appear only after the reference month has closed.
    Monthly,
}

impl Cadence {
    pub fn display_name(self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Monthly => "monthly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_fields_are_missing() {
        assert_eq!(Cell::from_field(""), Cell::Missing);
        assert_eq!(Cell::from_field("   "), Cell::Missing);
        assert_eq!(Cell::from_field("SC"), Cell::Text("SC".to_string()));
    }

    #[test]
    fn missing_renders_as_empty_field() {
        assert_eq!(Cell::Missing.to_string(), "");
        assert_eq!(Cell::Number(-99.0).to_string(), "-99.0");
        assert_eq!(Cell::Number(2712.35).to_string(), "2712.35");
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Table::new(cols(&["uf", "valor", "uf"])).unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("uf".to_string()));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut table = Table::new(cols(&["uf", "valor"])).unwrap();
        table.push_row(vec![Cell::from_field("SC"), Cell::Missing]).unwrap();
        let err = table.push_row(vec![Cell::Missing]).unwrap_err();
        assert_eq!(
            err,
            TableError::RowWidth {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn series_id_accepts_prefixed_codes() {
        assert_eq!("433".parse::<SeriesId>().unwrap(), SeriesId(433));
        assert_eq!("BCB_SGS_1".parse::<SeriesId>().unwrap(), SeriesId(1));
        assert!("ipca".parse::<SeriesId>().is_err());
    }
}
