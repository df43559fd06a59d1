//! Error types for Xata API operations.
//!
//! Errors are categorized so callers can tell "the workspace is gone" and
//! "the workspace already exists" apart from opaque transport failures.

/// Result type alias for Xata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network or server-side failure.
    Network,
    /// The addressed workspace does not exist.
    NotFound,
    /// The request conflicts with an existing workspace.
    Conflict,
    /// The API key was rejected.
    Auth,
    /// The response could not be decoded.
    Format,
    /// Other/unknown errors.
    Other,
}

/// Errors returned by a [`Gateway`](crate::gateway::Gateway).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resource does not exist (HTTP 404).
    #[error("{resource} not found: {message}")]
    NotFound {
        /// What was addressed, e.g. `workspace w-123`.
        resource: String,
        /// Server-provided message.
        message: String,
    },

    /// The request conflicts with existing state (HTTP 409).
    #[error("conflict: {message}")]
    Conflict {
        /// Server-provided message.
        message: String,
    },

    /// The API key was missing, invalid, or lacks permission (HTTP 401/403).
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Server-provided message.
        message: String,
    },

    /// Any other HTTP or transport failure.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The response body could not be decoded.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an error from a non-success HTTP status.
    pub fn from_status(
        status: u16,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound {
                resource: resource.into(),
                message,
            },
            409 => Self::Conflict { message },
            401 | 403 => Self::Unauthorized { message },
            _ => Self::HttpError {
                message,
                status: Some(status),
            },
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Conflict { .. } => ErrorCategory::Conflict,
            Error::Unauthorized { .. } => ErrorCategory::Auth,
            Error::HttpError { .. } => ErrorCategory::Network,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Whether the request collided with an existing resource.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.category() == ErrorCategory::Conflict
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => {
                Self::from_status(code, "resource", format!("HTTP {code}"))
            }
            ureq::Error::Json(err) => Self::InvalidResponse(err.to_string()),
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
