//! Input/output helpers.
//!
//! - delimited-file ingest (`ingest`)
//! - table and series exports (`export`)
//! - JSON column-rule files (`rules`)

pub mod export;
pub mod ingest;
pub mod rules;

pub use export::*;
pub use ingest::*;
pub use rules::*;
