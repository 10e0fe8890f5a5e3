//! Credential resolution.
//!
//! An environment variable derived from the account's email address takes
//! precedence over the password stored in the account file:
//!
//! ```text
//! user.name@example.com  →  MAIL_PASS_USER_NAME_EXAMPLE_COM
//! ```

use std::fmt;

use tracing::debug;

use super::Account;

/// Default namespace tag prefixed to override variable names.
pub const DEFAULT_NAMESPACE: &str = "MAIL_PASS";

/// Looks up a variable by name.
type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// The effective secret for one account. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Builds the override variable name for an email address.
///
/// Every character that cannot appear in a portable environment variable
/// name (`@`, `.`, `-`, `+`, ...) becomes `_`, and the result is upper-cased.
#[must_use]
pub fn env_key(namespace: &str, email: &str) -> String {
    let suffix: String = email
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{namespace}_{suffix}")
}

/// Resolves the effective credential for an account.
pub struct CredentialResolver {
    namespace: String,
    lookup: Lookup,
}

impl CredentialResolver {
    /// Creates a resolver reading overrides from the process environment.
    #[must_use]
    pub fn from_env(namespace: impl Into<String>) -> Self {
        Self::with_lookup(namespace, |key| std::env::var(key).ok())
    }

    /// Creates a resolver with a custom variable lookup.
    #[must_use]
    pub fn with_lookup<F>(namespace: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            namespace: namespace.into(),
            lookup: Box::new(lookup),
        }
    }

    /// Returns the namespace tag.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the override variable name for an account.
    #[must_use]
    pub fn key_for(&self, account: &Account) -> String {
        env_key(&self.namespace, &account.email)
    }

    fn override_for(&self, account: &Account) -> Option<String> {
        (self.lookup)(&self.key_for(account)).filter(|value| !value.is_empty())
    }

    /// Returns true if a non-empty override is set for the account.
    #[must_use]
    pub fn has_override(&self, account: &Account) -> bool {
        self.override_for(account).is_some()
    }

    /// Returns the override if set, else the stored password.
    ///
    /// `None` means no credential is available; callers treat that as a
    /// definitive failure for the account, not a retryable one.
    #[must_use]
    pub fn resolve(&self, account: &Account) -> Option<Credential> {
        if let Some(secret) = self.override_for(account) {
            debug!(account = %account.email, "using credential from environment");
            return Some(Credential(secret));
        }

        account.stored_password().map(Credential::new)
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::from_env(DEFAULT_NAMESPACE)
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
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
    use std::collections::HashMap;

    use super::*;

    fn resolver(vars: &[(&str, &str)]) -> CredentialResolver {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CredentialResolver::with_lookup(DEFAULT_NAMESPACE, move |key| vars.get(key).cloned())
    }

    #[test]
    fn env_key_replaces_separators() {
        assert_eq!(
            env_key("MAIL_PASS", "user@example.com"),
            "MAIL_PASS_USER_EXAMPLE_COM"
        );
        assert_eq!(
            env_key("MAIL_PASS", "first.last@mail.example.co.uk"),
            "MAIL_PASS_FIRST_LAST_MAIL_EXAMPLE_CO_UK"
        );
    }

    #[test]
    fn env_key_replaces_other_invalid_characters() {
        assert_eq!(
            env_key("MAIL_PASS", "a-b+tag@x.io"),
            "MAIL_PASS_A_B_TAG_X_IO"
        );
    }

    #[test]
    fn env_key_custom_namespace() {
        assert_eq!(env_key("PURGE", "a@b.c"), "PURGE_A_B_C");
    }

    #[test]
    fn override_wins_over_stored_password() {
        let account = Account::new("user@example.com", "pop.example.com").with_password("stored");
        let resolver = resolver(&[("MAIL_PASS_USER_EXAMPLE_COM", "from-env")]);
        assert_eq!(
            resolver.resolve(&account),
            Some(Credential::new("from-env"))
        );
        assert!(resolver.has_override(&account));
    }

    #[test]
    fn falls_back_to_stored_password() {
        let account = Account::new("user@example.com", "pop.example.com").with_password("stored");
        let resolver = resolver(&[("MAIL_PASS_OTHER_EXAMPLE_COM", "x")]);
        assert_eq!(resolver.resolve(&account), Some(Credential::new("stored")));
        assert!(!resolver.has_override(&account));
    }

    #[test]
    fn empty_override_is_ignored() {
        let account = Account::new("user@example.com", "pop.example.com").with_password("stored");
        let resolver = resolver(&[("MAIL_PASS_USER_EXAMPLE_COM", "")]);
        assert_eq!(resolver.resolve(&account), Some(Credential::new("stored")));
    }

    #[test]
    fn nothing_available() {
        let account = Account::new("user@example.com", "pop.example.com");
        assert_eq!(resolver(&[]).resolve(&account), None);

        let account = account.with_password("");
        assert_eq!(resolver(&[]).resolve(&account), None);
    }

    #[test]
    fn credential_debug_is_redacted() {
        let debug = format!("{:?}", Credential::new("hunter2"));
        assert_eq!(debug, "Credential(***)");
    }

    #[test]
    fn key_for_uses_namespace() {
        let resolver = CredentialResolver::with_lookup("X", |_| None);
        let account = Account::new("u@d.com", "pop.d.com");
        assert_eq!(resolver.key_for(&account), "X_U_D_COM");
        assert_eq!(resolver.namespace(), "X");
    }
}
