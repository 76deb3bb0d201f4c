use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Failure modes of the submission and query boundaries.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Malformed or incomplete request. Never reaches the store or the engine.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The report store failed. Not retried here.
    #[error("report store error: {0:#}")]
    Storage(#[from] anyhow::Error),

    /// Same device already reported for this clinic inside the cooldown.
    #[error(
        "already reported for this clinic at {last_reported_at}; try again in {} minutes",
        .retry_after.num_minutes().max(1)
    )]
    RateLimited {
        last_reported_at: DateTime<Utc>,
        retry_after: Duration,
    },
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "validation",
            ReportError::Storage(_) => "storage",
            ReportError::RateLimited { .. } => "rate_limited",
        }
    }
}
