//! Shared-secret gate for `/admin`.
//!
//! The `admin` cookie is signed with the key from `ADMIN_SESSION_SECRET` and
//! holds the configured password digest. Any other value, a bad signature or
//! a missing cookie sends the caller to the login page with `?err=1`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use psicofinders_core::AdminSessionToken;
use psicofinders_core::gate::{Decision, admin_guard};

use crate::routes::found;
use crate::state::AppState;

pub const ADMIN_COOKIE: &str = "admin";

const ADMIN_COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Cookie issued after a successful login.
#[must_use]
pub fn admin_cookie(token: AdminSessionToken) -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE, token.into_inner()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(ADMIN_COOKIE_MAX_AGE_DAYS))
        .build()
}

/// Cookie that clears the admin session on the client.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(ADMIN_COOKIE).path("/").build()
}

/// Gate middleware. Apply with `from_fn_with_state`.
pub async fn admin_gate(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    request: Request,
    next: Next,
) -> Response {
    let marker = jar.get(ADMIN_COOKIE);
    let decision = admin_guard(
        request.uri().path(),
        marker.as_ref().map(Cookie::value),
        state.verifier(),
    );

    match decision {
        Decision::Allow => next.run(request).await,
        Decision::Redirect(location) => {
            tracing::debug!(path = %request.uri().path(), "Admin gate redirect");
            found(&location)
        }
    }
}
