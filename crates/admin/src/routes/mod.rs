//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Redirect to /admin
//! GET  /admin/login             - Password form
//! POST /admin/login/authorize   - Check the password, set the admin cookie
//! POST /admin/logout            - Clear the admin cookie
//! GET  /admin                   - Newest applications
//! GET  /admin/export            - CSV download
//! ```

pub mod applications;
pub mod auth;

use axum::{
    Router,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use psicofinders_core::gate::{ADMIN_AUTHORIZE_PATH, ADMIN_HOME_PATH, ADMIN_LOGIN_PATH};

use crate::state::AppState;

/// `302 Found` redirect to `location`.
#[must_use]
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_owned())]).into_response()
}

/// Create all admin routes. The gate is applied by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { found(ADMIN_HOME_PATH) }))
        .route(ADMIN_LOGIN_PATH, get(auth::login_page))
        .route(ADMIN_AUTHORIZE_PATH, post(auth::authorize))
        .route("/admin/logout", post(auth::logout))
        .route(ADMIN_HOME_PATH, get(applications::index))
        .route("/admin/export", get(applications::export))
}
