//! Error types.
//!
//! - `CalcError` is the engine taxonomy. Every engine function returns it, and a
//!   failure only ever covers the single unit being computed (one month, one
//!   provider, one percentile).
//! - `AppError` is what the `compdash` binary reports: a message plus a process
//!   exit code.

use thiserror::Error;

use crate::domain::MetricKind;

/// Engine error taxonomy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Curve anchors are non-monotonic, negative, or the first anchor is not > 0.
    #[error("Malformed benchmark curve for '{specialty}' ({metric}): {reason}")]
    MalformedBenchmark {
        specialty: String,
        metric: MetricKind,
        reason: String,
    },

    /// Tier thresholds not strictly increasing, first threshold != 0, or a bad rate.
    #[error("Malformed tier list: {0}")]
    MalformedTierList(String),

    /// No curve exists for the requested specialty/metric. Callers render this as
    /// "no rank available", never as zero.
    #[error("No {metric} benchmark for specialty '{specialty}'")]
    MissingBenchmark { specialty: String, metric: MetricKind },

    /// NaN/infinite or out-of-range numeric input.
    #[error("Invalid numeric input ({field}): {value}")]
    InvalidNumericInput { field: String, value: f64 },

    /// A month vector that does not hold exactly 12 values.
    #[error("Monthly series '{field}' must have 12 values, got {len}")]
    SeriesLength { field: String, len: usize },

    /// A tiered model refers to a tier list that is not defined.
    #[error("Unknown tier list '{0}'")]
    UnknownTierList(String),
}

impl CalcError {
    pub fn invalid(field: impl Into<String>, value: f64) -> Self {
        CalcError::InvalidNumericInput {
            field: field.into(),
            value,
        }
    }
}

/// Reject NaN and infinities for a named input.
pub fn ensure_finite(field: &str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(field, value))
    }
}

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
}

impl From<CalcError> for AppError {
    fn from(err: CalcError) -> Self {
        AppError::new(2, err.to_string())
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
