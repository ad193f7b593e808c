//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                     - Redirect to /pros
//! GET  /pros                 - Landing page with the sign-up form
//! GET  /api/therapists       - Configuration status
//! POST /api/therapists       - Application intake (rate limited)
//! GET  /auth/callback        - Identity provider callback
//! POST /auth/callback        - Fragment tokens posted back by the callback page
//! POST /pro/logout           - Sign out
//!
//! # Pro area (behind the access gate)
//! GET  /pro                  - Redirect to the dashboard
//! GET  /pro/login            - Login page
//! POST /pro/login            - Password sign-in (rate limited)
//! GET  /pro/onboarding       - Onboarding form
//! POST /pro/onboarding       - Complete onboarding
//! GET  /pro/dashboard        - Profile summary
//! GET  /pro/perfil           - Profile form
//! POST /pro/perfil           - Save profile
//! GET  /pro/honorarios       - Fee form
//! POST /pro/honorarios       - Save fees
//! GET  /pro/agenda           - Weekly availability
//! POST /pro/agenda           - Save availability
//! GET  /pro/password         - Password form
//! POST /pro/password         - Change password
//! GET  /pro/preview          - Public profile preview
//! ```

pub mod agenda;
pub mod api;
pub mod auth;
pub mod dashboard;
pub mod fees;
pub mod forms;
pub mod home;
pub mod onboarding;
pub mod password;
pub mod preview;
pub mod profile;

use axum::{
    Router,
    http::{StatusCode, header::LOCATION},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use serde::Deserialize;

use psicofinders_core::gate::DASHBOARD_PATH;

use crate::db::TherapistRepository;
use crate::error::AppError;
use crate::middleware::{intake_rate_limiter, login_rate_limiter, pro_gate};
use crate::models::{Identity, TherapistProfile};
use crate::state::AppState;

/// `302 Found` redirect to `location`.
#[must_use]
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_owned())]).into_response()
}

/// `?saved=1`, set after a successful form post (post/redirect/get).
#[derive(Debug, Default, Deserialize)]
pub struct SavedQuery {
    pub saved: Option<String>,
}

impl SavedQuery {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.saved.as_deref() == Some("1")
    }
}

/// Load the caller's own profile row.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the caller has no row yet, and
/// `AppError::Database` when the store is unavailable or fails.
pub async fn own_profile(state: &AppState, identity: &Identity) -> Result<TherapistProfile, AppError> {
    TherapistRepository::new(state.pool()?, identity)
        .get_profile()
        .await?
        .ok_or(AppError::NotFound)
}

/// Routes under `/pro`, all wrapped by the access gate.
pub fn pro_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/pro", get(|| async { found(DASHBOARD_PATH) }))
        .route(
            "/pro/login",
            get(auth::login_page).merge(post(auth::login).layer(login_rate_limiter())),
        )
        .route(
            "/pro/onboarding",
            get(onboarding::page).post(onboarding::submit),
        )
        .route("/pro/dashboard", get(dashboard::page))
        .route("/pro/perfil", get(profile::page).post(profile::submit))
        .route("/pro/honorarios", get(fees::page).post(fees::submit))
        .route("/pro/agenda", get(agenda::page).post(agenda::submit))
        .route("/pro/password", get(password::page).post(password::submit))
        .route("/pro/preview", get(preview::page))
        .layer(from_fn_with_state(state.clone(), pro_gate))
}

/// Create all routes for the site.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { found(home::LANDING_PATH) }))
        .route(home::LANDING_PATH, get(home::landing))
        .route(
            "/api/therapists",
            get(api::status).merge(post(api::submit).layer(intake_rate_limiter())),
        )
        .route(
            "/auth/callback",
            get(auth::callback).post(auth::callback_tokens),
        )
        // Signing out needs no onboarding check, so it sits outside the gate.
        .route("/pro/logout", post(auth::logout))
        .merge(pro_routes(state))
}
