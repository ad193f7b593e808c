//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use psicofinders_core::AdminCredentialVerifier;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::RepositoryError;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: Option<PgPool>,
    verifier: AdminCredentialVerifier,
    cookie_key: Key,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: Option<PgPool>) -> Self {
        let verifier = AdminCredentialVerifier::new(config.password_hash.clone());
        let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
        let cookie_key = Key::from(digest.as_slice());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                verifier,
                cookie_key,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// The database pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` when no database is configured.
    pub fn pool(&self) -> Result<&PgPool, RepositoryError> {
        self.inner.pool.as_ref().ok_or(RepositoryError::Unavailable)
    }

    #[must_use]
    pub fn verifier(&self) -> &AdminCredentialVerifier {
        &self.inner.verifier
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}
