//! Account file loading.
//!
//! The account list lives in a JSON document:
//!
//! ```json
//! {
//!   "accounts": [
//!     { "email": "user@example.com", "server": "pop.example.com", "port": 995 }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::model::Account;
use super::validation::validate_account;
use crate::{Error, Result};

/// On-disk shape of the account file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountFile {
    /// Accounts in processing order.
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Read-only access to the account file.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    path: PathBuf,
}

impl AccountRepository {
    /// Create a repository for the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every account, preserving file order.
    ///
    /// Invalid records are kept (they fail at their own session step) but
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load(&self) -> Result<Vec<Account>> {
        if !self.path.exists() {
            return Err(Error::AccountsNotFound(self.path.clone()));
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let accounts = Self::parse(&raw)?;
        debug!(path = %self.path.display(), count = accounts.len(), "loaded accounts");
        Ok(accounts)
    }

    /// Parse an account document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON of the expected shape.
    pub fn parse(raw: &str) -> Result<Vec<Account>> {
        let file: AccountFile = serde_json::from_str(raw)?;

        for (position, account) in file.accounts.iter().enumerate() {
            if let Err(errors) = validate_account(account) {
                let problems: Vec<&str> = errors.iter().map(|e| e.message()).collect();
                warn!(
                    position = position + 1,
                    account = %account.email,
                    "invalid account record: {}",
                    problems.join(", ")
                );
            }
        }

        Ok(file.accounts)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_order() {
        let accounts = AccountRepository::parse(
            r#"{"accounts": [
                {"email": "b@example.com", "server": "pop.b.example.com"},
                {"email": "a@example.com", "server": "pop.a.example.com", "enabled": false}
            ]}"#,
        )
        .unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].email, "b@example.com");
        assert_eq!(accounts[1].email, "a@example.com");
        assert!(!accounts[1].enabled);
    }

    #[test]
    fn parse_missing_accounts_key_is_empty() {
        assert!(AccountRepository::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn parse_malformed() {
        let err = AccountRepository::parse("{\"accounts\": [").unwrap_err();
        assert!(matches!(err, Error::Serde(_)));
    }

    #[test]
    fn parse_keeps_invalid_records() {
        let accounts =
            AccountRepository::parse(r#"{"accounts": [{"email": "nobody", "server": ""}]}"#)
                .unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn load_missing_file() {
        let repo = AccountRepository::new("/nonexistent/mailpurge/accounts.json");
        let err = repo.load().unwrap_err();
        assert!(matches!(err, Error::AccountsNotFound(_)));
    }

    #[test]
    fn load_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "mailpurge-accounts-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"accounts": [{"email": "a@example.com", "server": "pop.example.com"}]}"#,
        )
        .unwrap();

        let repo = AccountRepository::new(&path);
        let accounts = repo.load().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(repo.path(), path.as_path());
    }
}
