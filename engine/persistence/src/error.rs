//! Error types for the persistence layer

use thiserror::Error;

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Record does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Compare-and-swap lost against a concurrent writer
    #[error("Version conflict on {key}: expected {expected:?}, found {actual:?}")]
    VersionConflict { key: String, expected: Option<u64>, actual: Option<u64> },

    /// Write would replace or alter a locked pick set
    #[error("Pick set {0} is locked")]
    LockedPickSet(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format or corruption
    #[error("Data corruption: {0}")]
    Corruption(String),
}

impl PersistenceError {
    /// Create a new not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
