//! Cleanup orchestration across accounts.
//!
//! Accounts are processed strictly in list order, one session finished
//! (including teardown) before the next starts. A failed account never
//! stops the loop.

mod summary;

use std::time::Duration;

use tracing::info;

pub use summary::RunSummary;

use crate::account::{Account, CredentialResolver, DEFAULT_NAMESPACE};
use crate::report::{Reporter, SessionEvent};
use crate::session::{Connector, MailboxSession, SessionOutcome};

/// Default bound on every network operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for a cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    /// Bound on connecting and on every read/write.
    pub timeout: Duration,
    /// Prefix of credential override variables.
    pub namespace: String,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl CleanupConfig {
    /// Sets the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the credential namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

/// Purges every enabled account in a list.
#[derive(Debug)]
pub struct Cleanup<C, R> {
    connector: C,
    reporter: R,
    credentials: CredentialResolver,
    timeout: Duration,
}

impl<C: Connector, R: Reporter> Cleanup<C, R> {
    /// Creates an orchestrator reading credential overrides from the
    /// process environment.
    #[must_use]
    pub fn new(config: CleanupConfig, connector: C, reporter: R) -> Self {
        Self {
            connector,
            reporter,
            credentials: CredentialResolver::from_env(config.namespace),
            timeout: config.timeout,
        }
    }

    /// Replaces the credential resolver.
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialResolver) -> Self {
        self.credentials = credentials;
        self
    }

    /// Returns the reporter.
    #[must_use]
    pub const fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Consumes the orchestrator and returns the reporter.
    #[must_use]
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Processes every account in order and returns the run totals.
    ///
    /// The summary is also handed to the reporter, exactly once.
    pub async fn run(&mut self, accounts: &[Account]) -> RunSummary {
        info!("Starting cleanup for {} account(s)", accounts.len());
        let mut summary = RunSummary::start();

        for account in accounts {
            if !account.enabled {
                self.reporter.on_event(account, &SessionEvent::Skipped);
                summary.record_skip();
                continue;
            }

            let outcome = self.process(account).await;
            summary.record(outcome);
        }

        summary.finish();
        self.reporter.on_summary(&summary);
        summary
    }

    async fn process(&mut self, account: &Account) -> SessionOutcome {
        self.reporter.on_event(account, &SessionEvent::Started);

        let credential = self.credentials.resolve(account);
        let session = MailboxSession::new(account, &self.connector, self.timeout);
        let result = session.run(credential.as_ref(), &mut self.reporter).await;

        if let Err(err) = &result {
            self.reporter
                .on_event(account, &SessionEvent::Failed(err.clone()));
        }

        SessionOutcome::from(&result)
    }
}
