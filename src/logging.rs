//! Log subscriber bootstrap for the `sgs` binary.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::error::AppError;

pub const LOG_LEVEL_ENV: &str = "SGS_LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Parse a level name (`error`, `warn`, `info`, `debug`, `trace`).
pub fn parse_log_level(raw: &str) -> Result<Level, AppError> {
    Level::from_str(raw.trim()).map_err(|_| {
        AppError::new(
            2,
            format!("Invalid log level '{raw}' (expected error, warn, info, debug or trace)."),
        )
    })
}

/// Resolve the level: explicit flag, then `SGS_LOG_LEVEL`, then `info`.
pub fn resolve_log_level(flag: Option<&str>) -> Result<Level, AppError> {
    let from_env = std::env::var(LOG_LEVEL_ENV).ok();
    let raw = flag
        .map(str::to_string)
        .or(from_env)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    parse_log_level(&raw)
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// reports.
pub fn init(level: Level) -> Result<(), AppError> {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::new(2, format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level(" debug ").unwrap(), Level::DEBUG);
    }

    #[test]
    fn bogus_level_is_a_usage_error() {
        assert_eq!(parse_log_level("loud").unwrap_err().exit_code(), 2);
    }

    #[test]
    fn explicit_flag_wins() {
        assert_eq!(resolve_log_level(Some("error")).unwrap(), Level::ERROR);
    }
}
