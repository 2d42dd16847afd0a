//! Remote time-series sources.

pub mod bcb;
pub mod variations;

pub use bcb::{BatchFetch, BcbClient, BcbConfig, FetchedSeries, SeriesPoint, series_name};
pub use variations::{Variation, compute_variations};
