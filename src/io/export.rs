//! Write repaired tables and fetched series back out.
//!
//! The files are meant to be picked up by the spreadsheet/database loaders, so
//! nulls are written as empty fields and numbers without locale formatting.

use std::fs::File;
use std::path::Path;

use crate::data::{FetchedSeries, compute_variations, series_name};
use crate::domain::{Table, format_number};
use crate::error::AppError;

/// Write `table` with the given delimiter (header first).
pub fn write_table(path: &Path, table: &Table, delimiter: u8) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create output '{}': {e}", path.display())))?;
    write_table_to(file, table, delimiter)
}

pub fn write_table_to<W: std::io::Write>(writer: W, table: &Table, delimiter: u8) -> Result<(), AppError> {
    let mut out = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    out.write_record(table.columns())
        .map_err(|e| AppError::new(2, format!("Failed to write header: {e}")))?;
    for row in table.rows() {
        out.write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(|e| AppError::new(2, format!("Failed to write row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush output: {e}")))?;
    Ok(())
}

/// Write fetched SGS points as a long-format CSV, one row per observation.
pub fn write_points_csv(path: &Path, series: &[FetchedSeries], with_variations: bool) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_points_to(file, series, with_variations)
}

pub fn write_points_to<W: std::io::Write>(
    writer: W,
    series: &[FetchedSeries],
    with_variations: bool,
) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["series_id", "nome_indicador", "data", "valor"];
    if with_variations {
        header.extend(["variacao_diaria", "variacao_mensal", "variacao_anual"]);
    }
    out.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for fetched in series {
        let id = fetched.window.series;
        let series_id = format!("BCB_SGS_{id}");
        let name = series_name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Série BCB {id}"));

        for v in compute_variations(&fetched.points, fetched.window.cadence) {
            let mut record = vec![
                series_id.clone(),
                name.clone(),
                v.point.date.format("%Y-%m-%d").to_string(),
                format_number(v.point.value),
            ];
            if with_variations {
                for pct in [v.daily_pct, v.monthly_pct, v.yearly_pct] {
                    record.push(pct.map(|p| format!("{p:.4}")).unwrap_or_default());
                }
            }
            out.write_record(&record)
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::SeriesPoint;
    use crate::domain::{Cadence, Cell, SeriesId};
    use crate::window::DateWindow;

    #[test]
    fn nulls_are_written_as_empty_fields() {
        let table = Table::from_rows(
            vec!["uf".to_string(), "valor".to_string()],
            vec![
                vec![Cell::Text("SC".to_string()), Cell::Missing],
                vec![Cell::Text("AC".to_string()), Cell::Number(-99.0)],
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        write_table_to(&mut buf, &table, b'\t').unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "uf\tvalor\nSC\t\nAC\t-99.0\n");
    }

    #[test]
    fn points_export_is_oldest_first() {
        let d = |m| NaiveDate::from_ymd_opt(2025, m, 1).unwrap();
        let fetched = FetchedSeries {
            window: DateWindow {
                series: SeriesId(433),
                cadence: Cadence::Monthly,
                start: d(1),
                end: d(10),
                notices: Vec::new(),
            },
            points: vec![
                SeriesPoint { date: d(9), value: 0.48 },
                SeriesPoint { date: d(8), value: 0.4 },
            ],
        };

        let mut buf = Vec::new();
        write_points_to(&mut buf, &[fetched], true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "series_id,nome_indicador,data,valor,variacao_diaria,variacao_mensal,variacao_anual"
        );
        assert!(lines[1].starts_with("BCB_SGS_433,IPCA - Inflação (% m/m),2025-08-01,0.4,"));
        assert!(lines[2].contains("2025-09-01,0.48,,20.0000,"));
    }
}
