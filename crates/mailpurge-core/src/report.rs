//! Run reporting.
//!
//! The orchestrator and each session push [`SessionEvent`]s and one final
//! [`RunSummary`](crate::RunSummary) into a [`Reporter`]. [`TracingReporter`]
//! turns them into log lines.

use tracing::{error, info, warn};

use crate::account::Account;
use crate::cleanup::RunSummary;
use crate::session::{FailureKind, SessionError};

/// Per-account event of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Account is disabled; nothing was attempted.
    Skipped,
    /// Session is about to start.
    Started,
    /// Opening the connection.
    Connecting {
        /// Server hostname.
        server: String,
        /// Server port.
        port: u16,
    },
    /// Greeting received.
    Connected,
    /// Credentials accepted.
    Authenticated,
    /// Listing received.
    MessagesFound(usize),
    /// Deletions committed.
    Deleted(usize),
    /// Session failed.
    Failed(SessionError),
}

/// Consumer of run progress.
pub trait Reporter {
    /// Called for every event of an account, in order.
    fn on_event(&mut self, account: &Account, event: &SessionEvent);

    /// Called exactly once, after the last account.
    fn on_summary(&mut self, summary: &RunSummary);
}

/// Reporter that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_event(&mut self, account: &Account, event: &SessionEvent) {
        let email = account.email.as_str();
        match event {
            SessionEvent::Skipped => info!(account = email, "Skipping disabled account"),
            SessionEvent::Started => info!(account = email, "Processing account"),
            SessionEvent::Connecting { server, port } => {
                info!(account = email, "Connecting to {server}:{port}...");
            }
            SessionEvent::Connected => info!(account = email, "Connected. Authenticating..."),
            SessionEvent::Authenticated => {
                info!(account = email, "Logged in. Listing messages...");
            }
            SessionEvent::MessagesFound(count) => {
                info!(account = email, count, "Found {count} messages");
            }
            SessionEvent::Deleted(0) => info!(account = email, "No messages to delete"),
            SessionEvent::Deleted(count) => {
                info!(account = email, count, "Deleted {count} messages");
            }
            SessionEvent::Failed(err) => match err.kind {
                FailureKind::MissingCredential => {
                    error!(account = email, kind = %err.kind, "No password configured");
                }
                FailureKind::Timeout => {
                    error!(account = email, kind = %err.kind, "Timed out: {}", err.detail);
                }
                _ => error!(account = email, kind = %err.kind, "Error - {}", err.detail),
            },
        }
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        if summary.accounts_failed() > 0 {
            warn!(
                failed = summary.accounts_failed(),
                "Some accounts could not be cleaned"
            );
        }
        info!(
            succeeded = summary.accounts_succeeded,
            total = summary.accounts_total,
            skipped = summary.accounts_skipped,
            deleted = summary.messages_deleted_total,
            elapsed_ms = summary.elapsed().map(|d| d.num_milliseconds()),
            "Cleanup completed: {}/{} accounts processed, {} total messages deleted",
            summary.accounts_succeeded,
            summary.accounts_total,
            summary.messages_deleted_total
        );
    }
}
