use thiserror::Error;

/// Typed error enum for remote catalog operations.
///
/// Differentiates failure modes so callers can pick an appropriate retry
/// strategy and the orchestrator can surface a useful message.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Authentication failed (401, 403) - the API key is missing or invalid.
    /// Permanent, never retried.
    #[error("Authentication failed: {message} (status: {status})")]
    Authentication { status: u16, message: String },

    /// Rate limiting (429). Retried with backoff, honoring the server's
    /// retry-after when present.
    #[error("Rate limited: {message} (retry after: {retry_after:?}s)")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Server error (500+). Transient, retried.
    #[error("Server error: {message} (status: {status})")]
    ServerError { status: u16, message: String },

    /// Other client error (400-499). Permanent, not retried.
    #[error("Client error: {message} (status: {status})")]
    ClientError { status: u16, message: String },

    /// Network-level failure (timeout, connection refused). Transient.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A request the caller should never have issued (page 0, a local-only
    /// category on the wire). Caught before anything is sent.
    #[error("Invalid request: {0}")]
    Validation(String),
}

impl ApiError {
    /// Whether the error is transient and worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::ServerError { .. } | ApiError::RateLimit { .. }
        )
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimit { .. })
    }

    /// Server-requested wait for rate-limit errors.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ApiError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Network(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            ApiError::Network(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            ApiError::Parse(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Authentication {
                status,
                message: body,
            },
            429 => ApiError::RateLimit {
                message: body,
                retry_after: None,
            },
            400..=499 => ApiError::ClientError {
                status,
                message: body,
            },
            500..=599 => ApiError::ServerError {
                status,
                message: body,
            },
            _ => ApiError::Network(format!("HTTP {}: {}", status, body)),
        }
    }
}
