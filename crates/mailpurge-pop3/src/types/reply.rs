//! POP3 reply types.

use std::fmt;

/// Status indicator of a POP3 reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `+OK`
    Ok,
    /// `-ERR`
    Err,
}

impl Status {
    /// Returns the wire form of the indicator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "+OK",
            Self::Err => "-ERR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// POP3 reply from server.
///
/// `lines` holds the data lines of a multi-line reply, already un-stuffed
/// and without the terminating `.`; it is empty for single-line replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Status indicator.
    pub status: Status,
    /// Text following the status indicator.
    pub text: String,
    /// Data lines of a multi-line reply.
    pub lines: Vec<String>,
}

impl Reply {
    /// Creates a single-line reply.
    #[must_use]
    pub fn new(status: Status, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
            lines: Vec::new(),
        }
    }

    /// Returns true if the status is `+OK`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}
