//! Errors raised by the core computations.

use thiserror::Error;

/// Failures of aggregation, smoothing and decomposition.
///
/// `EmptyInput` is soft: callers render a "no data" placeholder.
/// `InsufficientData` is local to one decomposed metric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("no data for the current filters")]
    EmptyInput,

    #[error("insufficient data: decomposition needs {required} calendar days, series spans {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid seasonal period {0}: periods must be >= 2")]
    InvalidPeriod(usize),

    #[error("invalid smoothing window {0}: windows must be >= 1 day")]
    InvalidWindow(u32),

    #[error("invalid loess span {0}: spans must be odd and >= 3")]
    InvalidSpan(usize),
}

impl AnalyticsError {
    /// Soft errors degrade to empty output rather than a reported failure.
    pub fn is_soft(&self) -> bool {
        matches!(self, AnalyticsError::EmptyInput)
    }
}
