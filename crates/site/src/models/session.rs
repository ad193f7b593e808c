//! Session-related types.
//!
//! The identity provider session is kept client-side in an encrypted cookie;
//! the resolved identity travels through request extensions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use psicofinders_core::TherapistId;

/// Name of the encrypted cookie carrying the [`ProviderSession`].
pub const SESSION_COOKIE: &str = "pf_session";

/// Seconds before expiry at which the access token is already treated as stale.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Tokens issued by the identity provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which `access_token` stops being valid.
    pub expires_at: i64,
}

impl ProviderSession {
    /// Build from a token response relative to `now`.
    #[must_use]
    pub fn issued(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: now.timestamp().saturating_add(expires_in),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp().saturating_add(EXPIRY_LEEWAY_SECS) >= self.expires_at
    }
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// An authenticated pro account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user id; also the primary key of the caller's profile row.
    pub id: TherapistId,
    pub email: Option<String>,
}

/// Request extension set by the `/pro` gate for every allowed request
/// made by a signed-in account.
#[derive(Debug, Clone)]
pub struct ProCaller {
    pub identity: Identity,
    pub session: ProviderSession,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_expiry_with_leeway() {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap();
        let session = ProviderSession::issued("a".into(), "r".into(), 3600, now);
        assert!(!session.is_expired(now));
        assert!(!session.is_expired(now + chrono::Duration::seconds(3500)));
        assert!(session.is_expired(now + chrono::Duration::seconds(3580)));
        assert!(session.is_expired(now + chrono::Duration::seconds(3600)));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = ProviderSession {
            access_token: "eyJhbGciOi".into(),
            refresh_token: "r-123".into(),
            expires_at: 1,
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("eyJhbGciOi"));
        assert!(!rendered.contains("r-123"));
    }
}
