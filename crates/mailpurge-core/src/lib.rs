//! # mailpurge-core
//!
//! Mailbox cleanup engine for `mailpurge`.
//!
//! This crate provides:
//! - Account records, loading and validation
//! - Credential resolution with environment overrides
//! - The per-account POP3 purge session with guaranteed teardown
//! - Run orchestration and reporting

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod cleanup;
mod error;
pub mod report;
pub mod session;

pub use account::credentials;
pub use account::{
    Account, AccountFile, AccountRepository, Credential, CredentialResolver, ValidationError,
    ValidationResult, validate_account,
};
pub use cleanup::{Cleanup, CleanupConfig, RunSummary};
pub use error::{Error, Result};
pub use report::{Reporter, SessionEvent, TracingReporter};
pub use session::{
    Connector, FailureKind, MailboxSession, SessionError, SessionOutcome, SessionResult,
    SessionState, TlsConnector,
};
