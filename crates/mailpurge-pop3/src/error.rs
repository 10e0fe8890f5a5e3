//! Error types for POP3 operations.

use std::io;
use std::time::Duration;

/// Result type alias for POP3 operations.
pub type Result<T> = std::result::Result<T, Error>;

/// POP3 error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Server answered with `-ERR`.
    #[error("{command} rejected: {message}")]
    Negative {
        /// Command keyword that was rejected (e.g. `PASS`).
        command: &'static str,
        /// Text following `-ERR`.
        message: String,
    },

    /// Protocol error (unexpected or malformed response).
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Creates a negative-reply error for a command.
    #[must_use]
    pub fn negative(command: &'static str, message: impl Into<String>) -> Self {
        Self::Negative {
            command,
            message: message.into(),
        }
    }

    /// Returns true if this error is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true if the server explicitly rejected a command.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        matches!(self, Self::Negative { .. })
    }
}
