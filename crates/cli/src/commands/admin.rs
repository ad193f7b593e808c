//! Backoffice credential commands.
//!
//! # Usage
//!
//! ```bash
//! pf-cli admin hash-password
//! ```
//!
//! Prints `ADMIN_PASSWORD_HASH=<hex>` for the admin environment.

use std::io::IsTerminal;

use psicofinders_core::AdminDigest;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Shortest password accepted for the backoffice.
const MIN_PASSWORD_LENGTH: usize = 12;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("A terminal is required to read the password")]
    NotATerminal,

    #[error("Failed to read password: {0}")]
    Read(#[from] std::io::Error),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    #[error("Passwords do not match")]
    Mismatch,
}

/// Prompt twice (no echo) and print the digest line.
///
/// # Errors
///
/// Returns `AdminError` if stdin is not a terminal, reading fails, the
/// password is too short or the confirmation differs.
pub fn hash_password() -> Result<(), AdminError> {
    if !std::io::stdin().is_terminal() {
        return Err(AdminError::NotATerminal);
    }

    let first = SecretString::from(rpassword::prompt_password("Admin password: ")?);
    let second = SecretString::from(rpassword::prompt_password("Repeat password: ")?);
    let digest = digest_for(&first, &second)?;

    #[allow(clippy::print_stdout)]
    {
        println!("ADMIN_PASSWORD_HASH={}", digest.as_str());
    }
    Ok(())
}

fn digest_for(first: &SecretString, second: &SecretString) -> Result<AdminDigest, AdminError> {
    let password = first.expose_secret();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::TooShort);
    }
    if password != second.expose_secret() {
        return Err(AdminError::Mismatch);
    }
    Ok(AdminDigest::of(password))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use psicofinders_core::AdminCredentialVerifier;

    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn test_digest_is_accepted_by_verifier() {
        let digest = digest_for(&secret("correct horse battery"), &secret("correct horse battery"))
            .unwrap();
        assert_eq!(digest.as_str().len(), 64);
        let verifier = AdminCredentialVerifier::new(Some(digest));
        assert!(verifier.verify("correct horse battery").is_ok());
    }

    #[test]
    fn test_rejects_short_and_mismatched() {
        assert!(matches!(
            digest_for(&secret("short"), &secret("short")),
            Err(AdminError::TooShort)
        ));
        assert!(matches!(
            digest_for(&secret("correct horse battery"), &secret("correct horse staple")),
            Err(AdminError::Mismatch)
        ));
    }
}
