//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - dispatches to the repair / window / fetch workflows
//! - prints reports and writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::warn;

use crate::cli::{Cli, Command, FetchArgs, RepairArgs, WindowArgs};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sgs` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let level = crate::logging::resolve_log_level(cli.log_level.as_deref())?;
    crate::logging::init(level)?;

    match cli.command {
        Command::Repair(args) => handle_repair(args),
        Command::Window(args) => handle_window(args),
        Command::Fetch(args) => handle_fetch(args),
    }
}

fn handle_repair(args: RepairArgs) -> Result<(), AppError> {
    let run = pipeline::run_repair(&args)?;
    println!(
        "{}",
        crate::report::format_repair_summary(&run.ingested, &run.outcome)
    );
    println!("Written: {}", run.output.display());
    Ok(())
}

fn handle_window(args: WindowArgs) -> Result<(), AppError> {
    let today = resolve_today(args.window.today);
    for window in pipeline::resolve_windows(&args.window, today)? {
        print!("{}", crate::report::format_window(&window));
    }
    Ok(())
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let today = resolve_today(args.window.today);
    let (windows, batch) = pipeline::run_fetch(&args.window, today)?;

    for window in &windows {
        print!("{}", crate::report::format_window(window));
    }
    println!();
    println!("{}", crate::report::format_fetch_summary(&batch));

    if let Some(path) = &args.export {
        crate::io::export::write_points_csv(path, &batch.fetched, args.variations)?;
        println!("Written: {}", path.display());
    }

    if !batch.failed.is_empty() {
        warn!(failed = batch.failed.len(), total = windows.len(), "some series failed");
        return Err(AppError::new(
            4,
            format!("{} of {} series failed to fetch.", batch.failed.len(), windows.len()),
        ));
    }
    Ok(())
}

fn resolve_today(override_date: Option<NaiveDate>) -> NaiveDate {
    override_date.unwrap_or_else(|| Local::now().date_naive())
}
