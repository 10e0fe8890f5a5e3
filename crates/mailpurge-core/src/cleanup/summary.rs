//! Run totals.

use chrono::{DateTime, TimeDelta, Utc};

use crate::session::SessionOutcome;

/// Aggregate of one cleanup run.
///
/// Counters only grow. Disabled accounts count toward `accounts_skipped`
/// and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Accounts a session was attempted for.
    pub accounts_total: usize,
    /// Accounts purged and committed.
    pub accounts_succeeded: usize,
    /// Disabled accounts.
    pub accounts_skipped: usize,
    /// Messages deleted across successful accounts.
    pub messages_deleted_total: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` while running.
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// Starts an empty summary now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            accounts_total: 0,
            accounts_succeeded: 0,
            accounts_skipped: 0,
            messages_deleted_total: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Folds one session outcome in.
    pub const fn record(&mut self, outcome: SessionOutcome) {
        self.accounts_total += 1;
        if outcome.succeeded {
            self.accounts_succeeded += 1;
            self.messages_deleted_total += outcome.messages_deleted;
        }
    }

    /// Records a disabled account.
    pub const fn record_skip(&mut self) {
        self.accounts_skipped += 1;
    }

    /// Stamps the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Attempted accounts that did not succeed.
    #[must_use]
    pub const fn accounts_failed(&self) -> usize {
        self.accounts_total - self.accounts_succeeded
    }

    /// Wall time of the run, once finished.
    #[must_use]
    pub fn elapsed(&self) -> Option<TimeDelta> {
        self.finished_at.map(|end| end - self.started_at)
    }
}
