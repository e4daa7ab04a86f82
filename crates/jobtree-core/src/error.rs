//! Error types for the Jobtree engine.

use serde::Serialize;
use thiserror::Error;

use crate::capability::Capability;

/// A shared error type for every Jobtree crate.
///
/// Structural failures (`InvalidNesting`, `NotPermitted`, `InvalidMove`) are
/// raised before anything is handed to a writer, so they never leave partial
/// state behind. `DispatchRejected` is reported once for a whole batch.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum JobtreeError {
    /// A task would become its own ancestor, or be nested under itself.
    #[error("Invalid nesting: '{task_id}' cannot be placed under '{parent_id}'")]
    InvalidNesting { task_id: String, parent_id: String },

    /// The capability provider refused the operation.
    #[error("Not permitted: missing '{capability}' capability")]
    NotPermitted { capability: Capability },

    /// No key fits between the two neighbours.
    #[error("Position allocation exhausted between {prev:?} and {next:?}")]
    AllocationExhausted { prev: Option<i64>, next: Option<i64> },

    /// The persistence collaborator rejected the batch.
    #[error("Dispatch rejected: {0}")]
    DispatchRejected(String),

    /// A move referenced an anchor that is not among the target siblings
    /// (only raised when strict anchors are enabled).
    #[error("Anchor '{anchor_id}' for task '{task_id}' is not a sibling in the target list")]
    AnchorNotFound { task_id: String, anchor_id: String },

    /// The move set itself is malformed (duplicates, self anchors, anchor cycles).
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// A drag session was driven out of order.
    #[error("Invalid drag state: {0}")]
    InvalidDragState(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobtreeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidNesting error
    pub fn invalid_nesting(task_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::InvalidNesting {
            task_id: task_id.into(),
            parent_id: parent_id.into(),
        }
    }

    /// Creates an InvalidMove error
    pub fn invalid_move(message: impl Into<String>) -> Self {
        Self::InvalidMove(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True for errors raised synchronously before any write is attempted.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidNesting { .. }
                | Self::NotPermitted { .. }
                | Self::InvalidMove(_)
                | Self::AnchorNotFound { .. }
        )
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an AllocationExhausted error
    pub fn is_allocation_exhausted(&self) -> bool {
        matches!(self, Self::AllocationExhausted { .. })
    }

    /// Check if the writer rejected the batch
    pub fn is_dispatch_rejected(&self) -> bool {
        matches!(self, Self::DispatchRejected(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for JobtreeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for JobtreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for JobtreeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for JobtreeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for JobtreeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, JobtreeError>`.
pub type Result<T> = std::result::Result<T, JobtreeError>;
