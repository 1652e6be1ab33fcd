//! Error types for meridian-control.

use meridian_api::ApiError;

/// Result type alias using [`ControlError`].
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while reconciling a cluster.
///
/// Remote failures always carry the operation name and the cluster (or
/// entity) identifier, so callers can branch on the variant instead of
/// parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The desired-state document is malformed; nothing was sent to the
    /// control plane.
    #[error("validation error: {0}")]
    Validation(String),

    /// A control-plane call failed.
    #[error("{operation} failed for cluster {cluster_id:?}: {source}")]
    Operation {
        /// Name of the remote operation that failed.
        operation: &'static str,
        /// Cluster the operation targeted.
        cluster_id: String,
        /// Underlying API error.
        #[source]
        source: ApiError,
    },

    /// A long-running operation terminated with an error payload.
    #[error("{operation} on cluster {cluster_id:?} reported failure: {message}")]
    OperationFailed {
        /// Name of the remote operation that failed.
        operation: &'static str,
        /// Cluster the operation targeted.
        cluster_id: String,
        /// Failure message reported by the operation.
        message: String,
    },

    /// The reconciliation deadline fired before the operation finished.
    #[error("{operation} on cluster {cluster_id:?} timed out")]
    Timeout {
        /// Name of the remote operation that was abandoned.
        operation: &'static str,
        /// Cluster the operation targeted.
        cluster_id: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap an API error with the operation name and cluster identifier.
    #[must_use]
    pub fn operation(operation: &'static str, cluster_id: impl Into<String>, source: ApiError) -> Self {
        Self::Operation {
            operation,
            cluster_id: cluster_id.into(),
            source,
        }
    }

    /// Create an operation-level failure error.
    #[must_use]
    pub fn operation_failed(
        operation: &'static str,
        cluster_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::OperationFailed {
            operation,
            cluster_id: cluster_id.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(operation: &'static str, cluster_id: impl Into<String>) -> Self {
        Self::Timeout {
            operation,
            cluster_id: cluster_id.into(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if retrying the whole call-and-wait cycle may help.
    ///
    /// Covers the internal-error class of API failures and operations that
    /// reported failure without a definitive permanent cause.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Operation { source, .. } => source.is_transient(),
            Self::OperationFailed { .. } => true,
            Self::Validation(_) | Self::Timeout { .. } | Self::Config(_) | Self::Internal(_) => {
                false
            }
        }
    }
}
