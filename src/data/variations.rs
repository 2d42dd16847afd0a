//! Period-over-period changes for fetched series.

use super::bcb::SeriesPoint;
use crate::domain::Cadence;

/// Observation lags (daily, monthly, yearly) per cadence. Daily series use
/// ~30 calendar days and ~252 business days as month/year proxies.
fn lags(cadence: Cadence) -> (Option<usize>, usize, usize) {
    match cadence {
        Cadence::Daily => (Some(1), 30, 252),
        Cadence::Monthly => (None, 1, 12),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    pub point: SeriesPoint,
    /// Percent change versus the previous observation (daily series only).
    pub daily_pct: Option<f64>,
    pub monthly_pct: Option<f64>,
    pub yearly_pct: Option<f64>,
}

/// Percent changes for each point, oldest first.
pub fn compute_variations(points: &[SeriesPoint], cadence: Cadence) -> Vec<Variation> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.date);

    let (daily, monthly, yearly) = lags(cadence);
    (0..sorted.len())
        .map(|i| Variation {
            point: sorted[i],
            daily_pct: daily.and_then(|lag| pct_change(&sorted, i, lag)),
            monthly_pct: pct_change(&sorted, i, monthly),
            yearly_pct: pct_change(&sorted, i, yearly),
        })
        .collect()
}

fn pct_change(points: &[SeriesPoint], i: usize, lag: usize) -> Option<f64> {
    let prev = points.get(i.checked_sub(lag)?)?.value;
    let pct = (points[i].value / prev - 1.0) * 100.0;
    pct.is_finite().then_some(pct)
}
