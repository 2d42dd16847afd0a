//! Delimited-file ingest into a [`Table`].
//!
//! Every field is read as text; typing happens later in the repair rules, the
//! same way the exports were originally loaded with everything as strings.
//! Rows that cannot be squared with the header are reported, not fatal.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use clap::ValueEnum;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{Cell, Table};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Delimiter {
    /// Tab for `.tsv`, `.md` and `.txt` files, comma otherwise.
    Auto,
    Tab,
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn resolve(self, path: &Path) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Auto => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase);
                match ext.as_deref() {
                    Some("tsv" | "md" | "txt") => b'\t',
                    _ => b',',
                }
            }
        }
    }
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: Table,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn read_table(path: &Path, delimiter: Delimiter) -> Result<IngestedTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;
    let ingested = read_table_from(file, delimiter.resolve(path))?;
    info!(
        path = %path.display(),
        rows = ingested.table.len(),
        columns = ingested.table.columns().len(),
        rejected = ingested.row_errors.len(),
        "table loaded"
    );
    Ok(ingested)
}

pub fn read_table_from<R: Read>(reader: R, delimiter: u8) -> Result<IngestedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read header row: {e}")))?
        .clone();
    let columns: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let width = columns.len();
    let mut table = Table::new(columns).map_err(|e| AppError::new(2, e.to_string()))?;

    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Parse error: {e}"),
                });
                continue;
            }
        };

        match record_to_cells(&record, width) {
            Ok(cells) => {
                // Width is guaranteed by `record_to_cells`.
                table
                    .push_row(cells)
                    .map_err(|e| AppError::new(2, format!("Line {line}: {e}")))?;
            }
            Err(message) => {
                warn!(line, error = %message, "row rejected");
                row_errors.push(RowError { line, message });
            }
        }
    }

    Ok(IngestedTable {
        table,
        row_errors,
        rows_read,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet tools often prefix UTF-8 exports with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Short rows are padded with nulls; long rows are only accepted when the
/// overflow is blank (trailing delimiters).
fn record_to_cells(record: &StringRecord, width: usize) -> Result<Vec<Cell>, String> {
    let mut cells: Vec<Cell> = record.iter().map(Cell::from_field).collect();
    if cells.len() > width {
        if cells[width..].iter().any(|c| !c.is_missing()) {
            return Err(format!("Row has {} fields, header has {width}.", cells.len()));
        }
        cells.truncate(width);
    }
    cells.resize(width, Cell::Missing);
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn tab_separated_export_is_loaded_as_text() {
        let data = "\u{feff}id_fato\tdata_referencia\tvalor\n1\t45413\t2712,35\n2\t\t-100\n";
        let ingested = read_table_from(data.as_bytes(), b'\t').unwrap();

        assert_eq!(ingested.table.columns(), ["id_fato", "data_referencia", "valor"]);
        assert_eq!(ingested.rows_read, 2);
        assert_eq!(ingested.table.rows()[0], vec![text("1"), text("45413"), text("2712,35")]);
        assert_eq!(ingested.table.rows()[1][1], Cell::Missing);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let data = "a,b,c\n1,2\n1,2,3,4\n1,2,3,,\n";
        let ingested = read_table_from(data.as_bytes(), b',').unwrap();

        assert_eq!(ingested.table.len(), 2);
        assert_eq!(ingested.table.rows()[0], vec![text("1"), text("2"), Cell::Missing]);
        assert_eq!(ingested.table.rows()[1], vec![text("1"), text("2"), text("3")]);
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 3);
    }

    #[test]
    fn duplicate_headers_fail() {
        let err = read_table_from("uf,uf\nSC,SC\n".as_bytes(), b',').unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn auto_delimiter_follows_extension() {
        assert_eq!(Delimiter::Auto.resolve(Path::new("docs/fact_cub_detalhado.md")), b'\t');
        assert_eq!(Delimiter::Auto.resolve(Path::new("out.CSV")), b',');
        assert_eq!(Delimiter::Semicolon.resolve(Path::new("x.tsv")), b';');
    }
}
