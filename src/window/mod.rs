//! Date windows for SGS fetches.
//!
//! Asking the SGS API for dates that cannot contain data yet (today for a
//! daily series, the current month for a monthly one) either returns nothing
//! or errors out. The validator here works out the last date a series could
//! plausibly have published, defaults missing bounds from it and clamps the
//! requested end down to it.
//!
//! Everything in this module is pure: "today" is always an argument.

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Cadence, SeriesId};

pub mod catalog;

pub use catalog::SeriesCatalog;

/// Date format used on the SGS query string and accepted from callers.
pub const WINDOW_DATE_FORMAT: &str = "%d/%m/%Y";

pub const DEFAULT_LOOKBACK_MONTHS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Unknown SGS series {0}: not classified as daily or monthly.")]
    UnknownSeries(SeriesId),

    #[error(
        "Invalid window: start {} is after end {}.",
        .start.format(WINDOW_DATE_FORMAT),
        .end.format(WINDOW_DATE_FORMAT)
    )]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Invalid {field} date '{value}' (expected DD/MM/YYYY).")]
    InvalidDate { field: &'static str, value: String },

    #[error("Series {0} is listed as both daily and monthly.")]
    OverlappingSeries(SeriesId),
}

/// Non-fatal adjustment made while validating a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    DateClamped {
        requested: NaiveDate,
        clamped_to: NaiveDate,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::DateClamped {
                requested,
                clamped_to,
            } => write!(
                f,
                "end date {} clamped to {} (no data published yet)",
                requested.format(WINDOW_DATE_FORMAT),
                clamped_to.format(WINDOW_DATE_FORMAT)
            ),
        }
    }
}

/// A validated `[start, end]` window for one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub series: SeriesId,
    pub cadence: Cadence,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub notices: Vec<Notice>,
}

impl DateWindow {
    pub fn start_str(&self) -> String {
        self.start.format(WINDOW_DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(WINDOW_DATE_FORMAT).to_string()
    }

    pub fn was_clamped(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, Notice::DateClamped { .. }))
    }
}

/// Last date a series of the given cadence can have a value for.
///
/// - daily: yesterday (values land D+1)
/// - monthly: last day of the previous month
pub fn latest_available(cadence: Cadence, today: NaiveDate) -> NaiveDate {
    let anchor = match cadence {
        Cadence::Daily => today,
        Cadence::Monthly => today.with_day(1).unwrap_or(today),
    };
    anchor.pred_opt().unwrap_or(anchor)
}

pub fn parse_window_date(field: &'static str, raw: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(raw.trim(), WINDOW_DATE_FORMAT).map_err(|_| WindowError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct WindowValidator {
    catalog: SeriesCatalog,
    lookback_months: u32,
}

impl WindowValidator {
    pub fn new(catalog: SeriesCatalog) -> Self {
        Self {
            catalog,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
        }
    }

    pub fn with_lookback_months(mut self, months: u32) -> Self {
        self.lookback_months = months;
        self
    }

    pub fn catalog(&self) -> &SeriesCatalog {
        &self.catalog
    }

    pub fn classify(&self, id: SeriesId) -> Result<Cadence, WindowError> {
        self.catalog.classify(id)
    }

    /// Resolve the effective window for `id`.
    ///
    /// The end is defaulted to, or clamped down to, the latest available date.
    /// A missing start defaults to that latest date minus the lookback. A
    /// window whose start ends up after its end is an error, never swapped.
    pub fn validate(
        &self,
        id: SeriesId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<DateWindow, WindowError> {
        let cadence = self.classify(id)?;
        let latest = latest_available(cadence, today);
        let mut notices = Vec::new();

        let end = match end {
            None => {
                info!(series = %id, cadence = cadence.display_name(), end = %latest, "end date defaulted");
                latest
            }
            Some(requested) if requested > latest => {
                warn!(
                    series = %id,
                    requested = %requested,
                    clamped_to = %latest,
                    "requested end date has no published data yet; clamped"
                );
                notices.push(Notice::DateClamped {
                    requested,
                    clamped_to: latest,
                });
                latest
            }
            Some(requested) => requested,
        };

        let start = match start {
            Some(start) => start,
            None => latest
                .checked_sub_months(Months::new(self.lookback_months))
                .unwrap_or(NaiveDate::MIN),
        };

        if start > end {
            return Err(WindowError::InvalidWindow { start, end });
        }

        Ok(DateWindow {
            series: id,
            cadence,
            start,
            end,
            notices,
        })
    }

    /// [`validate`](Self::validate) over `DD/MM/YYYY` strings.
    pub fn validate_str(
        &self,
        id: SeriesId,
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<DateWindow, WindowError> {
        let start = start.map(|s| parse_window_date("start", s)).transpose()?;
        let end = end.map(|s| parse_window_date("end", s)).transpose()?;
        self.validate(id, start, end, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: SeriesId = SeriesId(1);
    const MONTHLY: SeriesId = SeriesId(433);

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn validator() -> WindowValidator {
        WindowValidator::new(SeriesCatalog::bcb())
    }

    #[test]
    fn daily_series_defaults_to_yesterday() {
        let w = validator().validate(DAILY, None, None, d(2025, 11, 15)).unwrap();
        assert_eq!(w.cadence, Cadence::Daily);
        assert_eq!(w.end, d(2025, 11, 14));
        assert_eq!(w.start, d(2024, 11, 14));
        assert!(w.notices.is_empty());
    }

    #[test]
    fn monthly_series_defaults_to_end_of_previous_month() {
        let w = validator().validate(MONTHLY, None, None, d(2025, 11, 15)).unwrap();
        assert_eq!(w.cadence, Cadence::Monthly);
        assert_eq!(w.end, d(2025, 10, 31));
        assert_eq!(w.start, d(2024, 10, 31));
    }

    #[test]
    fn end_inside_current_month_is_clamped_with_notice() {
        let w = validator()
            .validate_str(MONTHLY, None, Some("10/11/2025"), d(2025, 11, 15))
            .unwrap();
        assert_eq!(w.end, d(2025, 10, 31));
        assert_eq!(w.end_str(), "31/10/2025");
        assert_eq!(
            w.notices,
            vec![Notice::DateClamped {
                requested: d(2025, 11, 10),
                clamped_to: d(2025, 10, 31),
            }]
        );
        assert!(w.was_clamped());
    }

    #[test]
    fn earlier_end_is_kept_and_never_moved_up() {
        let w = validator()
            .validate_str(MONTHLY, Some("01/01/2023"), Some("31/12/2023"), d(2025, 11, 15))
            .unwrap();
        assert_eq!(w.start_str(), "01/01/2023");
        assert_eq!(w.end_str(), "31/12/2023");
        assert!(w.notices.is_empty());
    }

    #[test]
    fn end_equal_to_latest_is_not_a_clamp() {
        let w = validator()
            .validate(DAILY, None, Some(d(2025, 11, 14)), d(2025, 11, 15))
            .unwrap();
        assert!(!w.was_clamped());
    }

    #[test]
    fn start_after_clamped_end_is_an_error() {
        let err = validator()
            .validate_str(MONTHLY, Some("05/11/2025"), Some("20/11/2025"), d(2025, 11, 15))
            .unwrap_err();
        assert_eq!(
            err,
            WindowError::InvalidWindow {
                start: d(2025, 11, 5),
                end: d(2025, 10, 31),
            }
        );
        assert!(err.to_string().contains("05/11/2025"));
    }

    #[test]
    fn unknown_series_is_fatal() {
        let err = validator().validate(SeriesId(1207), None, None, d(2025, 11, 15)).unwrap_err();
        assert_eq!(err, WindowError::UnknownSeries(SeriesId(1207)));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let err = validator()
            .validate_str(DAILY, None, Some("2025-11-10"), d(2025, 11, 15))
            .unwrap_err();
        assert!(matches!(err, WindowError::InvalidDate { field: "end", .. }));
    }

    #[test]
    fn january_rolls_back_into_previous_year() {
        assert_eq!(latest_available(Cadence::Monthly, d(2026, 1, 1)), d(2025, 12, 31));
        assert_eq!(latest_available(Cadence::Daily, d(2026, 1, 1)), d(2025, 12, 31));
    }

    #[test]
    fn lookback_is_configurable() {
        let w = validator()
            .with_lookback_months(3)
            .validate(MONTHLY, None, None, d(2025, 3, 10))
            .unwrap();
        assert_eq!(w.end, d(2025, 2, 28));
        assert_eq!(w.start, d(2024, 11, 28));
    }
}
