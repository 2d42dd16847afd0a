//! Spreadsheet serial dates -> ISO strings.
//!
//! Spreadsheet exports frequently lose their cell formatting and hand us
//! day counts instead of dates (`45413` for 2024-05-01). The 1900 date system
//! counts days from 1899-12-30, with the fractional part carrying the time of
//! day.
//!
//! Only values strictly greater than `SERIAL_THRESHOLD` are treated as serials.
//! That is a magnitude heuristic, which is why it is only ever applied to
//! columns the caller explicitly declared as dates.

use chrono::{Days, NaiveDate, NaiveTime};
use tracing::{debug, warn};

use super::{PassStats, parse_decimal};
use crate::domain::Cell;

pub const SERIAL_THRESHOLD: f64 = 1000.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
const LAST_SECOND_OF_DAY: u32 = 86_399;

/// Output shape for converted serials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialFormat {
    /// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS` when the serial has a fractional day.
    Auto,
    /// Always `YYYY-MM-DD HH:MM:SS`.
    DateTime,
}

fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert a serial to its ISO form, or `None` if it is not a plausible serial.
pub fn serial_to_iso(serial: f64, format: SerialFormat) -> Option<String> {
    if !serial.is_finite() || serial <= SERIAL_THRESHOLD {
        return None;
    }

    let days = serial.floor();
    let fraction = serial - days;
    let date = serial_epoch()?.checked_add_days(Days::new(days as u64))?;

    if format == SerialFormat::Auto && fraction == 0.0 {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    // Rounding can reach a full day for fractions within half a second of
    // midnight; keep the timestamp on the serial's own calendar day.
    let seconds = ((fraction * SECONDS_PER_DAY).round() as u32).min(LAST_SECOND_OF_DAY);
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(date.and_time(time).format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Convert every serial in `column` to an ISO date (or datetime when the
/// serial carries a time of day). Other cells are returned unchanged.
pub fn repair_dates(column: &[Cell]) -> Vec<Cell> {
    convert_column(column, SerialFormat::Auto).0
}

/// Like [`repair_dates`] but always emits a time part.
pub fn repair_datetimes(column: &[Cell]) -> Vec<Cell> {
    convert_column(column, SerialFormat::DateTime).0
}

pub(crate) fn convert_column(column: &[Cell], format: SerialFormat) -> (Vec<Cell>, PassStats) {
    let mut stats = PassStats::default();
    let mut unparsed_sample: Option<String> = None;
    let mut unparsed = 0usize;

    let cells = column
        .iter()
        .map(|cell| {
            let value = match cell {
                Cell::Missing => return Cell::Missing,
                Cell::Number(v) => Some(*v),
                Cell::Text(s) => {
                    let parsed = parse_decimal(s);
                    if parsed.is_none() {
                        debug!(value = %s, "not a numeric serial; left unchanged");
                        unparsed += 1;
                        unparsed_sample.get_or_insert_with(|| s.clone());
                    }
                    parsed
                }
            };

            match value.and_then(|v| serial_to_iso(v, format)) {
                Some(iso) => {
                    stats.converted += 1;
                    Cell::Text(iso)
                }
                None => {
                    stats.untouched += 1;
                    cell.clone()
                }
            }
        })
        .collect();

    if let Some(sample) = unparsed_sample {
        warn!(
            cells = unparsed,
            sample = %sample,
            "date cells are not spreadsheet serials; left unchanged"
        );
    }

    (cells, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn days_since_epoch(iso_date: &str) -> i64 {
        let d = NaiveDate::parse_from_str(&iso_date[..10], "%Y-%m-%d").unwrap();
        (d - NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()).num_days()
    }

    #[test]
    fn integral_serial_becomes_date() {
        assert_eq!(serial_to_iso(45413.0, SerialFormat::Auto).as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn fractional_serial_becomes_datetime() {
        assert_eq!(
            serial_to_iso(45972.74425, SerialFormat::Auto).as_deref(),
            Some("2025-11-11 17:51:43")
        );
    }

    #[test]
    fn datetime_format_always_has_time() {
        assert_eq!(
            serial_to_iso(45413.0, SerialFormat::DateTime).as_deref(),
            Some("2024-05-01 00:00:00")
        );
    }

    #[test]
    fn near_midnight_fraction_stays_on_same_day() {
        let iso = serial_to_iso(45413.999_999_9, SerialFormat::Auto).unwrap();
        assert_eq!(iso, "2024-05-01 23:59:59");
    }

    #[test]
    fn converted_date_recovers_floor_of_serial() {
        for serial in [1000.5, 25569.0, 36526.25, 45413.0, 45972.74425, 60000.9] {
            let iso = serial_to_iso(serial, SerialFormat::Auto).unwrap();
            assert_eq!(days_since_epoch(&iso), serial.floor() as i64, "serial {serial}");
        }
    }

    #[test]
    fn small_and_non_numeric_values_pass_through() {
        let column = vec![
            text("1000"),
            text("12"),
            Cell::Number(-100.0),
            text("2024-05-01"),
            text("jan/24"),
        ];
        assert_eq!(repair_dates(&column), column);
    }

    #[test]
    fn missing_cells_stay_missing() {
        let column = vec![Cell::Missing, text("45413"), Cell::Missing];
        let repaired = repair_dates(&column);
        assert_eq!(repaired, vec![Cell::Missing, text("2024-05-01"), Cell::Missing]);
        assert!(repaired.iter().all(|c| c.as_text() != Some("nan")));
    }

    #[test]
    fn comma_decimal_serials_are_accepted() {
        let repaired = repair_dates(&[text("45972,74425")]);
        assert_eq!(repaired, vec![text("2025-11-11 17:51:43")]);
    }

    #[test]
    fn numeric_cells_convert_too() {
        let (cells, stats) = convert_column(&[Cell::Number(45413.0), text("abc")], SerialFormat::Auto);
        assert_eq!(cells[0], text("2024-05-01"));
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.untouched, 1);
    }

    #[test]
    fn absurd_serials_do_not_panic() {
        assert_eq!(serial_to_iso(1e300, SerialFormat::Auto), None);
        assert_eq!(repair_dates(&[text("1e300")]), vec![text("1e300")]);
    }
}
