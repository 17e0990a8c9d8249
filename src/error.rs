//! Unified error hierarchy for pulseparse
//!
//! Sparse-data conditions (short history, no recorded load) are not errors:
//! they degrade to low-confidence output or an explicit sentinel. Only
//! structurally invalid input surfaces as a hard failure.

use chrono::NaiveDate;
use thiserror::Error;

/// Top-level error type for all pulseparse operations
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Not enough samples for the requested calculation
    #[error("Insufficient data for {calculation}: {reason}")]
    InsufficientData { calculation: String, reason: String },

    /// A single sample failed validation
    #[error("Invalid sample on {date}: {reason}")]
    InvalidSample { date: NaiveDate, reason: String },

    /// Sample dates are not strictly ascending
    #[error("Non-monotonic dates: {current} follows {previous}")]
    NonMonotonicDates {
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// Two samples share the same date
    #[error("Duplicate sample date: {date}")]
    DuplicateDate { date: NaiveDate },

    /// Invalid calculation parameter
    #[error("Invalid parameter {parameter}={value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// IO errors from file import/export
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for pulseparse operations
pub type Result<T> = std::result::Result<T, MetricsError>;

impl MetricsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MetricsError::InsufficientData { .. } => ErrorSeverity::Warning,
            MetricsError::InvalidSample { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            MetricsError::InsufficientData { calculation, .. } => {
                format!(
                    "Not enough data yet to calculate {}. Keep syncing daily samples.",
                    calculation
                )
            }
            MetricsError::NonMonotonicDates { .. } | MetricsError::DuplicateDate { .. } => {
                "Sample dates must be unique and in ascending order.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = MetricsError::InsufficientData {
            calculation: "readiness".to_string(),
            reason: "no samples".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = MetricsError::Configuration("bad toml".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_user_messages() {
        let err = MetricsError::InsufficientData {
            calculation: "readiness".to_string(),
            reason: "no samples".to_string(),
        };
        assert!(err.user_message().contains("Not enough data"));

        let err = MetricsError::DuplicateDate {
            date: NaiveDate::from_ymd_opt(2024, 9, 23).unwrap(),
        };
        assert!(err.user_message().contains("ascending order"));
    }
}
