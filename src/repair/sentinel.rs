//! "No data" sentinels in measurement columns.
//!
//! The CUB exports write `-100` where a state did not publish a value. Those
//! cells must become nulls, never zero. Cells that do not parse as numbers are
//! coerced to null as well: at this stage a garbled measurement is no more
//! usable than a missing one.

use super::{PassStats, parse_decimal};
use crate::domain::Cell;

pub const DEFAULT_SENTINEL: f64 = -100.0;

/// Parse `column` as numbers and null out every cell equal to `sentinel`.
pub fn repair_sentinel(column: &[Cell], sentinel: f64) -> Vec<Cell> {
    null_sentinels(column, sentinel).0
}

pub(crate) fn null_sentinels(column: &[Cell], sentinel: f64) -> (Vec<Cell>, PassStats) {
    let mut stats = PassStats::default();
    let cells = column
        .iter()
        .map(|cell| {
            let value = match cell {
                Cell::Missing => return Cell::Missing,
                Cell::Number(v) if v.is_finite() => Some(*v),
                Cell::Number(_) => None,
                Cell::Text(s) => parse_decimal(s),
            };
            match value {
                Some(v) if v == sentinel => {
                    stats.sentinels += 1;
                    Cell::Missing
                }
                Some(v) => {
                    stats.converted += 1;
                    Cell::Number(v)
                }
                None => {
                    stats.coerced += 1;
                    Cell::Missing
                }
            }
        })
        .collect();
    (cells, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn sentinel_becomes_null_but_neighbours_survive() {
        let repaired = repair_sentinel(&[text("-100"), text("-99")], DEFAULT_SENTINEL);
        assert_eq!(repaired, vec![Cell::Missing, Cell::Number(-99.0)]);
        assert_eq!(repaired[1].to_string(), "-99.0");
    }

    #[test]
    fn comma_and_dot_decimals_both_parse() {
        let repaired = repair_sentinel(&[text("2712,35"), text("2712.35"), text("-100,0")], DEFAULT_SENTINEL);
        assert_eq!(
            repaired,
            vec![Cell::Number(2712.35), Cell::Number(2712.35), Cell::Missing]
        );
    }

    #[test]
    fn unparseable_cells_are_coerced_to_null() {
        let (cells, stats) = null_sentinels(&[text("n/d"), text("1.234,56"), Cell::Missing], DEFAULT_SENTINEL);
        assert!(cells.iter().all(Cell::is_missing));
        assert_eq!(stats.coerced, 2);
        assert_eq!(stats.sentinels, 0);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let column = vec![text("-100"), text("abc"), text("5,5"), Cell::Number(-100.0)];
        let once = repair_sentinel(&column, DEFAULT_SENTINEL);
        let twice = repair_sentinel(&once, DEFAULT_SENTINEL);
        assert_eq!(once, twice);
        assert_eq!(once, vec![Cell::Missing, Cell::Missing, Cell::Number(5.5), Cell::Missing]);
    }

    #[test]
    fn custom_sentinel_is_respected() {
        let repaired = repair_sentinel(&[text("-999"), text("-100")], -999.0);
        assert_eq!(repaired, vec![Cell::Missing, Cell::Number(-100.0)]);
    }
}
