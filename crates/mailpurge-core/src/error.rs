//! Error types for the core library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run before any account is processed.
///
/// Per-account failures are [`crate::SessionError`]s and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// Account file does not exist.
    #[error("Account file not found: {}", .0.display())]
    AccountsNotFound(PathBuf),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
