//! Unified client error handling
//!
//! Every backend call reports failures through [`ClientError`]. Expected
//! business outcomes (task not found, completion rejected) are modelled as
//! result values by the scan layer instead.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// 401 or 403
        status: StatusCode,
        message: String,
        body: Option<String>,
    },

    #[error("Not found: {message}")]
    NotFound {
        message: String,
        body: Option<String>,
    },

    #[error("Request rejected ({status}): {message}")]
    Rejected {
        status: StatusCode,
        message: String,
        body: Option<String>,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No active session")]
    NotAuthenticated,

    #[error("Internal client error")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// Builds the error for a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: Option<String>) -> Self {
        let message = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized {
                status,
                message,
                body,
            },
            StatusCode::NOT_FOUND => Self::NotFound { message, body },
            _ => Self::Rejected {
                status,
                message,
                body,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Rejected { .. } => "REJECTED",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status carried by the error, if it came from a backend response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error body sent by the backend, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { body, .. } | Self::NotFound { body, .. } | Self::Rejected { body, .. } => {
                body.as_deref()
            }
            _ => None,
        }
    }

    /// Message suitable for showing to the person holding the device.
    ///
    /// Backend failures read as the status text followed by the error body,
    /// e.g. `Forbidden (Quest locked)`.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { message, body, .. }
            | Self::NotFound { message, body }
            | Self::Rejected { message, body, .. } => match body {
                Some(body) => format!("{message} ({body})"),
                None => message.clone(),
            },
            Self::Transport(msg) | Self::InvalidResponse(msg) => msg.clone(),
            Self::NotAuthenticated => "You need to log in first".to_string(),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
