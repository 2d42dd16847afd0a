//! `sgs-repair` library crate.
//!
//! The binary (`sgs`) is a thin wrapper around this library so that:
//!
//! - repair and window logic is testable without spawning processes
//! - the pure pieces (`repair`, `window`) can be reused by other loaders
//! - I/O stays at the edges (`io`, `data`)

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod repair;
pub mod report;
pub mod window;
