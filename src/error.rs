//! Error types shared across collaborator seams
//!
//! Collaborators (record store, acquisition service, cache backend) report
//! failures as [`BackendError`]. The core never lets these escape a single
//! query or poll iteration; they are logged and collapsed into a miss, a skip
//! or a retry.

use thiserror::Error;

/// Failure reported by an external collaborator
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached or refused the call
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An IO failure while reading or writing local data
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other collaborator failure
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Result type for collaborator calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// A scheduled wait was interrupted by shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wait cancelled by shutdown")]
pub struct Cancelled;
