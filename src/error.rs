//! Error types for the server cluster analyzer

use thiserror::Error;

/// Errors raised while loading records, building the graph or deriving clusters
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The same server identifier was supplied more than once
    #[error("duplicate server identifier: {0}")]
    DuplicateServer(String),

    /// A record could not be interpreted as a server with applications
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// No servers were supplied
    #[error("no servers to analyze")]
    EmptyInput,

    /// A partition or cluster broke a structural guarantee
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Data errors abort the run and are never retried
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::DuplicateServer(_) | AnalyzerError::MalformedRecord { .. }
        )
    }
}
