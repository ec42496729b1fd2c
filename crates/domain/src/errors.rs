//! Error types used throughout the workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for WorkLedger
///
/// Validation and authorization failures propagate to the caller; storage
/// and directory failures are tagged separately so the edge layer can map
/// them to transport-level responses.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum WorkLedgerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for WorkLedger operations
pub type Result<T> = std::result::Result<T, WorkLedgerError>;
