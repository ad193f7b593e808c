//! Admin credential verification.
//!
//! The backoffice is protected by one shared secret. Only its SHA-256 digest
//! is configured (`ADMIN_PASSWORD_HASH`); a successful login stores that same
//! digest in a signed cookie, and every later request is accepted when the
//! cookie value equals the configured digest.
//!
//! Without a configured digest nothing is ever accepted.

use core::fmt;

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of an admin secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminDigest(String);

impl AdminDigest {
    /// Hash a plaintext secret.
    #[must_use]
    pub fn of(secret: &str) -> Self {
        Self(hex::encode(Sha256::digest(secret.as_bytes())))
    }

    /// Wrap a configured reference digest, normalising to lowercase.
    ///
    /// Returns `None` for blank input so an empty variable counts as unset.
    #[must_use]
    pub fn from_hex(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AdminDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminDigest([REDACTED])")
    }
}

/// Session marker issued after a successful admin login.
///
/// Its value is the reference digest; the caller stores it in a signed cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSessionToken(String);

impl AdminSessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AdminSessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSessionToken([REDACTED])")
    }
}

/// Generic rejection. Never says whether the secret was wrong or unconfigured.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid credentials")]
pub struct Rejected;

/// Verifies admin secrets and session markers against the configured digest.
#[derive(Debug, Clone)]
pub struct AdminCredentialVerifier {
    reference: Option<AdminDigest>,
}

impl AdminCredentialVerifier {
    #[must_use]
    pub const fn new(reference: Option<AdminDigest>) -> Self {
        Self { reference }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.reference.is_some()
    }

    /// Check a submitted secret.
    ///
    /// # Errors
    ///
    /// Returns [`Rejected`] on mismatch or when no reference digest is configured.
    pub fn verify(&self, submitted: &str) -> Result<AdminSessionToken, Rejected> {
        let reference = self.reference.as_ref().ok_or(Rejected)?;
        let candidate = AdminDigest::of(submitted);
        if constant_time_eq(candidate.as_str(), reference.as_str()) {
            Ok(AdminSessionToken(reference.as_str().to_owned()))
        } else {
            Err(Rejected)
        }
    }

    /// Stateless session check: the cookie value must equal the reference digest.
    #[must_use]
    pub fn accepts_session(&self, marker: &str) -> bool {
        self.reference
            .as_ref()
            .is_some_and(|reference| constant_time_eq(marker, reference.as_str()))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
