//! Error types for the playback harness.

use chronoview_core::SeriesError;
use thiserror::Error;

/// Errors that can occur while generating, playing or exporting recordings.
#[derive(Debug, Error)]
pub enum SimError {
    /// Generated data failed record validation
    #[error("Invalid recording: {0}")]
    Series(#[from] SeriesError),

    /// Filesystem failure while exporting or reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config or manifest (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid harness configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl SimError {
    /// Creates a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
