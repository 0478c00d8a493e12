use thiserror::Error;

/// Errors from Spark Insight API calls.
///
/// Every variant except [`ApiError::ServiceUnavailable`] is the raw
/// transport outcome passed through unchanged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered 503 because the application is still being parsed.
    /// The transport guard has already redirected navigation by the time the
    /// caller sees this.
    #[error("backend is still processing: {message}")]
    ServiceUnavailable { message: String, body: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("parse error for {target}: {message}")]
    Parse { target: String, message: String },
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::ServiceUnavailable { .. } => Some(503),
            Self::Status { status, .. } => Some(*status),
            Self::Parse { .. } => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

/// Result type for API client operations.
pub type ApiResult<T> = Result<T, ApiError>;
