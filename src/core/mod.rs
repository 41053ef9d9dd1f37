use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by storage backends.
///
/// The mirror itself has no failure modes of its own: missing keys are
/// represented as absent values, never as errors, and redundant operations
/// are no-ops. Every error a mirror operation returns originated in the
/// backend and is propagated unmodified.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed inside a backend
    #[error("I/O error on '{path}': {details}")]
    Io {
        /// Path where the I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// The backend refused an operation
    #[error("storage backend rejected {operation} for key '{key}': {reason}")]
    Rejected {
        /// The operation that was refused
        operation: &'static str,
        /// Key the operation targeted
        key: String,
        /// Reason given by the backend
        reason: String,
    },

    /// The backend is unreachable or shut down
    #[error("storage backend unavailable: {details}")]
    Unavailable {
        /// Details about why the backend is unavailable
        details: String,
    },
}

/// A specialized `Result` type for mirror and backend operations.
pub type Result<T> = std::result::Result<T, StorageError>;
