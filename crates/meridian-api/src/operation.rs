//! Long-running operation descriptors.
//!
//! Every mutating control-plane call returns an [`Operation`] that executes
//! asynchronously on the remote side. Callers poll it to completion before
//! issuing the next mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A long-running control-plane operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    pub id: String,
    /// Human-readable description of what the operation does.
    #[serde(default)]
    pub description: String,
    /// When the operation was created.
    pub created_at: DateTime<Utc>,
    /// Whether the operation has terminated.
    pub done: bool,
    /// Failure payload, set only when the operation terminated with an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    /// Operation-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<OperationMetadata>,
}

impl Operation {
    /// Returns true if the operation terminated with an error payload.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Failure payload of a terminated operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    /// Numeric status code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

/// Metadata attached to an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// Cluster the operation applies to. For cluster creation this is the
    /// identifier assigned to the new cluster.
    pub cluster_id: String,
}
