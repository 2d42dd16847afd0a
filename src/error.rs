//! Application-level error carried up to `main`.
//!
//! Domain modules return their own `thiserror` enums (`RepairError`,
//! `WindowError`); everything that reaches the binary is folded into
//! `AppError`, which pairs a message with the process exit code:
//!
//! - `2`: usage, input file or configuration problems
//! - `3`: data problems (unknown series, invalid window, nothing usable)
//! - `4`: remote API failures

use crate::repair::RepairError;
use crate::window::WindowError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<WindowError> for AppError {
    fn from(err: WindowError) -> Self {
        let code = match err {
            WindowError::InvalidDate { .. } | WindowError::OverlappingSeries(_) => 2,
            WindowError::UnknownSeries(_) | WindowError::InvalidWindow { .. } => 3,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<RepairError> for AppError {
    fn from(err: RepairError) -> Self {
        AppError::new(3, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesId;

    #[test]
    fn window_errors_map_to_data_exit_code() {
        let err: AppError = WindowError::UnknownSeries(SeriesId(999_999)).into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("999999"));
    }

    #[test]
    fn malformed_date_is_a_usage_error() {
        let err: AppError = WindowError::InvalidDate {
            field: "end",
            value: "2025-13-01".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
    }
}
