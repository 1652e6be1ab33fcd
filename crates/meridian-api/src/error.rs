//! Error types for the control-plane client.

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the control-plane API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the control plane.
    #[error("API returned {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal control-plane error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound(entity.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the error means the entity does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if the error looks transient and the whole
    /// call-and-wait cycle is worth retrying.
    ///
    /// Only the internal-error class qualifies; every other failure is
    /// treated as permanent and surfaced immediately.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Status { code, .. } => *code >= 500,
            Self::Http(err) => err.status().is_some_and(|s| s.is_server_error()),
            Self::NotFound(_) | Self::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_class_errors_are_transient() {
        assert!(ApiError::internal("backend unavailable").is_transient());
        assert!(ApiError::Status {
            code: 500,
            message: "boom".to_owned(),
        }
        .is_transient());
        assert!(ApiError::Status {
            code: 503,
            message: "overloaded".to_owned(),
        }
        .is_transient());
    }

    #[test]
    fn client_class_errors_are_permanent() {
        assert!(!ApiError::Status {
            code: 400,
            message: "bad request".to_owned(),
        }
        .is_transient());
        assert!(!ApiError::not_found("cluster abc").is_transient());
        assert!(!ApiError::Decode("bad json".to_owned()).is_transient());
    }

    #[test]
    fn not_found_detection() {
        assert!(ApiError::not_found("cluster abc").is_not_found());
        assert!(!ApiError::internal("boom").is_not_found());
    }
}
