//! Account model types.

use serde::{Deserialize, Serialize};

/// Default POP3-over-TLS port.
pub const DEFAULT_PORT: u16 = 995;

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_enabled() -> bool {
    true
}

/// One mailbox to purge.
///
/// Read-only for the whole run. `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Email address; doubles as POP3 user name and log identity.
    pub email: String,
    /// Stored password, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// POP3 server hostname.
    pub server: String,
    /// POP3 server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether the account takes part in cleanup runs.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Account {
    /// Creates an enabled account on the default port without a password.
    #[must_use]
    pub fn new(email: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
            server: server.into(),
            port: DEFAULT_PORT,
            enabled: true,
            description: None,
        }
    }

    /// Sets the stored password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the stored password, treating an empty string as absent.
    #[must_use]
    pub fn stored_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("server", &self.server)
            .field("port", &self.port)
            .field("enabled", &self.enabled)
            .field("description", &self.description)
            .finish()
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
    fn deserialize_applies_defaults() {
        let account: Account =
            serde_json::from_str(r#"{"email": "a@example.com", "server": "pop.example.com"}"#)
                .unwrap();
        assert_eq!(account.port, 995);
        assert!(account.enabled);
        assert!(account.password.is_none());
        assert!(account.description.is_none());
    }

    #[test]
    fn deserialize_full_record() {
        let account: Account = serde_json::from_str(
            r#"{
                "email": "a@example.com",
                "password": "pw",
                "server": "pop.example.com",
                "port": 1995,
                "enabled": false,
                "description": "old newsletter box"
            }"#,
        )
        .unwrap();
        assert_eq!(account.port, 1995);
        assert!(!account.enabled);
        assert_eq!(account.stored_password(), Some("pw"));
        assert_eq!(account.description.as_deref(), Some("old newsletter box"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let account: Account = serde_json::from_str(
            r#"{"email": "a@example.com", "server": "pop.example.com", "folder": "INBOX"}"#,
        )
        .unwrap();
        assert_eq!(account.email, "a@example.com");
    }

    #[test]
    fn empty_password_is_absent() {
        let account = Account::new("a@example.com", "pop.example.com").with_password("");
        assert_eq!(account.stored_password(), None);
    }

    #[test]
    fn debug_redacts_password() {
        let account = Account::new("a@example.com", "pop.example.com").with_password("hunter2");
        let debug = format!("{account:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("a@example.com"));
    }

    #[test]
    fn builder_helpers() {
        let account = Account::new("a@example.com", "pop.example.com")
            .with_port(110)
            .with_enabled(false);
        assert_eq!(account.port, 110);
        assert!(!account.enabled);
    }
}
