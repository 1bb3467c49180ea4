//! Label service errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`ApiError::Transport`] | `API_TRANSPORT` | Yes |
//! | [`ApiError::Rejected`] | `API_REJECTED` | Only for 5xx |
//! | [`ApiError::Decode`] | `API_DECODE` | No |
//! | [`ApiError::InvalidUrl`] | `API_INVALID_URL` | No |

use relabel_types::ErrorCode;
use thiserror::Error;

/// Failure of one label service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// `error` field of the JSON body, or the raw body text.
        message: String,
    },

    /// A 2xx body could not be decoded.
    #[error("cannot decode response: {0}")]
    Decode(String),

    /// The configured base URL is unusable.
    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Builds a [`ApiError::Rejected`] from a status and raw body.
    ///
    /// A JSON body with a string `error` field contributes that field as
    /// the message; any other body is used verbatim.
    #[must_use]
    pub fn rejected(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                let raw = body.trim();
                if raw.is_empty() {
                    format!("HTTP {status}")
                } else {
                    raw.to_string()
                }
            });
        Self::Rejected { status, message }
    }

    /// Text published in `ERROR{message}`.
    ///
    /// Rejections surface the service's own message unchanged.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl ErrorCode for ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "API_TRANSPORT",
            Self::Rejected { .. } => "API_REJECTED",
            Self::Decode(_) => "API_DECODE",
            Self::InvalidUrl(_) => "API_INVALID_URL",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}
