use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain validation errors raised while building repository records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("search result {index} is missing required field `{field}`")]
    MissingField { field: &'static str, index: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Every domain error surfaces to clients as invalid data.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidDataFound
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Stable reason codes returned to clients.
///
/// The wire representation (`RATE_LIMIT_REACHED`, ...) is part of the public
/// contract; clients key their back-off behaviour on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The local budget or the remote API refused the call.
    RateLimitReached,
    /// A search result failed structural validation.
    InvalidDataFound,
    /// An outbound call failed for any other reason.
    FetchError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimitReached => "RATE_LIMIT_REACHED",
            Self::InvalidDataFound => "INVALID_DATA_FOUND",
            Self::FetchError => "FETCH_ERROR",
        }
    }

    /// Message shown to clients. Only rate limiting gets an actionable
    /// message; everything else is deliberately generic.
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::RateLimitReached => {
                "github rate limit reached. consider using a token to increase the limit or wait few minutes and try again"
            }
            Self::InvalidDataFound | Self::FetchError => {
                "internal server error. contact our support with the reason code for assistance"
            }
        }
    }

    pub const fn is_rate_limit(self) -> bool {
        matches!(self, Self::RateLimitReached)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body returned by the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.public_message().to_string(),
        }
    }
}
