//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::RepositoryError;
use crate::services::{IdentityClient, IdentityError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The database and the identity
/// provider are both optional: the site still serves its public pages
/// without them, and each dependent route reports the gap on its own.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: Option<PgPool>,
    identity: Option<IdentityClient>,
    cookie_key: Key,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider client cannot be built.
    pub fn new(config: SiteConfig, pool: Option<PgPool>) -> Result<Self, IdentityError> {
        let identity = config
            .identity
            .as_ref()
            .map(IdentityClient::new)
            .transpose()?;
        let cookie_key = derive_cookie_key(&config);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
                cookie_key,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
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
    pub fn has_database(&self) -> bool {
        self.inner.pool.is_some()
    }

    /// The identity provider client, if configured.
    #[must_use]
    pub fn identity(&self) -> Option<&IdentityClient> {
        self.inner.identity.as_ref()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}

/// 64-byte cookie key from the session secret.
fn derive_cookie_key(config: &SiteConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
