//! Per-account mailbox session.

mod connector;
mod mailbox;
mod state;

pub use connector::{Connector, TlsConnector};
pub use mailbox::MailboxSession;
pub use state::{FailureKind, SessionError, SessionOutcome, SessionResult, SessionState};
