//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the in-memory table model (`Table`, `Cell`)
//! - SGS series identifiers and cadences (`SeriesId`, `Cadence`)

pub mod types;

pub use types::*;
