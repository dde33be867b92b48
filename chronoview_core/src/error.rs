//! Error types for input records.
//!
//! Frame synthesis itself never fails; these errors are raised only when a
//! caller builds a record from malformed data.

use thiserror::Error;

/// Errors raised while constructing time series and source records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// Two index-aligned sequences have different lengths
    #[error("Length mismatch: {field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Timestamps go backwards
    #[error("Timestamps decrease at index {index} ({previous} > {current})")]
    NonMonotonic {
        index: usize,
        previous: f64,
        current: f64,
    },

    /// A timestamp is NaN or infinite
    #[error("Non-finite timestamp at index {0}")]
    NonFinite(usize),

    /// An image buffer does not match its declared shape
    #[error("Invalid image shape: {0}")]
    InvalidShape(String),

    /// Frames in one sequence have different shapes
    #[error("Frame {index} has shape {actual:?}, expected {expected:?}")]
    InconsistentShape {
        index: usize,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
}

impl SeriesError {
    /// Creates a length mismatch error.
    pub fn length(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            field,
            expected,
            actual,
        }
    }

    /// Creates an invalid shape error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }
}
