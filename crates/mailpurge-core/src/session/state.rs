//! Session states, failure kinds and outcomes.

use std::fmt;
use std::io;

/// Lifecycle of one mailbox session.
///
/// ```text
/// Disconnected → Connected → Authenticated → Enumerated → Deleting → Committed
///       └──────────────┴────────────┴──────────────┴───────────┴──→ Failed
/// every path ends in Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection yet.
    Disconnected,
    /// TLS established and greeting received.
    Connected,
    /// `USER`/`PASS` accepted.
    Authenticated,
    /// `LIST` answered.
    Enumerated,
    /// Marking messages with `DELE`.
    Deleting,
    /// `QUIT` accepted; deletions applied.
    Committed,
    /// Terminal failure.
    Failed(FailureKind),
    /// Connection released. Always the last state.
    Closed,
}

/// Why an account's session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection refused, unreachable host, TLS failure or bad greeting.
    ConnectError,
    /// A network operation exceeded the timeout.
    Timeout,
    /// Neither an environment override nor a stored password.
    MissingCredential,
    /// `USER` or `PASS` rejected.
    AuthError,
    /// Malformed listing, rejected `DELE`, or failed commit.
    ProtocolError,
}

impl FailureKind {
    /// Returns a stable identifier for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectError => "connect_error",
            Self::Timeout => "timeout",
            Self::MissingCredential => "missing_credential",
            Self::AuthError => "auth_error",
            Self::ProtocolError => "protocol_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account-scoped failure. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct SessionError {
    /// Failure classification.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub detail: String,
}

impl SessionError {
    /// Creates a session error.
    #[must_use]
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Classifies a protocol error raised while in a given step.
    ///
    /// Timeouts are reported as [`FailureKind::Timeout`] whatever the step;
    /// everything else takes the step's kind.
    #[must_use]
    pub fn from_pop3(err: &mailpurge_pop3::Error, step: FailureKind) -> Self {
        let kind = match err {
            mailpurge_pop3::Error::Timeout(_) => FailureKind::Timeout,
            mailpurge_pop3::Error::Io(io) if io.kind() == io::ErrorKind::TimedOut => {
                FailureKind::Timeout
            }
            _ => step,
        };
        Self::new(kind, err.to_string())
    }
}

/// What a session contributes to the run totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOutcome {
    /// Whether the mailbox was purged and committed.
    pub succeeded: bool,
    /// Messages removed; zero unless `succeeded`.
    pub messages_deleted: usize,
}

/// Result of one session: deleted count or failure.
pub type SessionResult = Result<usize, SessionError>;

impl From<&SessionResult> for SessionOutcome {
    fn from(result: &SessionResult) -> Self {
        match result {
            Ok(deleted) => Self {
                succeeded: true,
                messages_deleted: *deleted,
            },
            Err(_) => Self::default(),
        }
    }
}
