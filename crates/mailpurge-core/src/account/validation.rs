//! Account validation.

use super::model::Account;

/// Validation error for an account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email address is empty.
    EmptyEmail,
    /// Email address format is invalid.
    InvalidEmail,
    /// Server hostname is empty.
    EmptyServer,
    /// Port is invalid.
    InvalidPort,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "Email address is required",
            Self::InvalidEmail => "Invalid email address format",
            Self::EmptyServer => "POP3 server is required",
            Self::InvalidPort => "POP3 port must be 1-65535",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyServer => "server",
            Self::InvalidPort => "port",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating an account.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate an account record.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
/// A missing password is not an error here: it may come from the
/// environment at run time.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_account(account: &Account) -> ValidationResult {
    let mut errors = Vec::new();

    if account.email.trim().is_empty() {
        errors.push(ValidationError::EmptyEmail);
    } else if !is_valid_email(&account.email) {
        errors.push(ValidationError::InvalidEmail);
    }

    if account.server.trim().is_empty() {
        errors.push(ValidationError::EmptyServer);
    }
    if account.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let email = email.trim();

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain must contain at least one dot, with no empty labels
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
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
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email("user@sub.example.com"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@example..com"));
    }

    #[test]
    fn test_validate_empty_account() {
        let account = Account::new("", "").with_port(0);
        let errors = validate_account(&account).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyEmail,
                ValidationError::EmptyServer,
                ValidationError::InvalidPort
            ]
        );
    }

    #[test]
    fn test_validate_complete_account() {
        let account = Account::new("test@example.com", "pop.example.com");
        assert!(validate_account(&account).is_ok());
    }

    #[test]
    fn test_error_fields() {
        assert_eq!(ValidationError::InvalidEmail.field(), "email");
        assert_eq!(ValidationError::EmptyServer.field(), "server");
        assert_eq!(
            ValidationError::InvalidPort.to_string(),
            "POP3 port must be 1-65535"
        );
    }
}
