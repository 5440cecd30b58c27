//! Error types for outbound calls and the aggregation they feed.

use chrono::{DateTime, Utc};
use reposcope_core::ErrorCode;
use thiserror::Error;

/// Errors raised by a call to the source API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source API reported an exhausted quota.
    #[error("rate limited by GitHub (reset at {})", format_reset(.reset))]
    RateLimited { reset: Option<DateTime<Utc>> },

    /// The source API answered with a non-success status.
    #[error("HTTP {status} from GitHub: {message}")]
    Http { status: u16, message: String },

    /// A response body could not be parsed.
    #[error("parse error from GitHub: {message}")]
    Parse { message: String },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl SourceError {
    /// Returns `true` when the remote quota is exhausted.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn code(&self) -> ErrorCode {
        if self.is_rate_limit() {
            ErrorCode::RateLimitReached
        } else {
            ErrorCode::FetchError
        }
    }
}

fn format_reset(reset: &Option<DateTime<Utc>>) -> String {
    reset.map_or_else(|| "unknown".to_string(), |at| at.to_rfc3339())
}

/// Convenience alias for source API results.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors from the end-to-end latest-repositories operation.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The local rate budget refused the calls a phase needs.
    #[error("rate budget cannot cover {requested} call(s) for {phase}")]
    RateLimitReached { phase: &'static str, requested: u32 },

    /// A search result failed validation.
    #[error(transparent)]
    InvalidData(#[from] reposcope_core::Error),

    /// An outbound call failed.
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),
}

impl AggregateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RateLimitReached { .. } => ErrorCode::RateLimitReached,
            Self::InvalidData(e) => e.code(),
            Self::Source(e) => e.code(),
        }
    }
}

/// Convenience alias for aggregation results.
pub type AggregateResult<T> = std::result::Result<T, AggregateError>;
