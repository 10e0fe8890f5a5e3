//! Account management module.
//!
//! Provides the account record, credential resolution, file loading and
//! validation.

pub mod credentials;
mod model;
mod repository;
mod validation;

pub use credentials::{Credential, CredentialResolver, DEFAULT_NAMESPACE, env_key};
pub use model::{Account, DEFAULT_PORT};
pub use repository::{AccountFile, AccountRepository};
pub use validation::{ValidationError, ValidationResult, validate_account};
