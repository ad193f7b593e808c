//! Access gate for the `/pro` area.
//!
//! Translates each request into a [`psicofinders_core::gate::guard`] call:
//! resolve the session cookie, classify the path, consult the onboarding flag
//! only when needed, then either pass the request on (with a [`ProCaller`]
//! extension when signed in) or redirect.

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;

use psicofinders_core::gate::{Decision, guard};

use super::session::{read_session, removal_cookie, resolve, session_cookie};
use crate::db::TherapistRepository;
use crate::models::Identity;
use crate::models::session::SESSION_COOKIE;
use crate::routes::found;
use crate::state::AppState;

/// Debug header set on gate redirects while no identity provider is configured.
pub const MISSING_IDENTITY_HEADER: &str = "x-psicofinders-missing-identity";

/// Gate middleware for `/pro`. Apply with `from_fn_with_state`.
pub async fn pro_gate(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let query = request.uri().query().map(str::to_owned);

    let stored = read_session(&jar);
    let had_cookie = stored.is_some();
    let resolved = match (state.identity(), stored) {
        (Some(client), Some(session)) => resolve(client, session).await,
        _ => None,
    };

    let mut jar = jar;
    match &resolved {
        Some(r) if r.refreshed => {
            jar = jar.add(session_cookie(&r.caller.session, state.config().secure_cookies()));
        }
        None if had_cookie => jar = jar.remove(removal_cookie()),
        _ => {}
    }

    let identity = resolved.as_ref().map(|r| &r.caller.identity);
    let lookup_state = state.clone();
    let outcome = guard(&path, query.as_deref(), identity, |identity: &Identity| {
        let identity = identity.clone();
        async move {
            match lookup_state.pool() {
                Ok(pool) => {
                    TherapistRepository::new(pool, &identity)
                        .onboarding_state()
                        .await
                }
                Err(e) => Err(e),
            }
        }
    })
    .await;

    if let Some(err) = &outcome.lookup_error {
        tracing::warn!(error = %err, path = %path, "Onboarding lookup failed, allowing request");
    }

    match outcome.decision {
        Decision::Redirect(location) => {
            let mut response = (jar, found(&location)).into_response();
            if state.identity().is_none() {
                response
                    .headers_mut()
                    .insert(MISSING_IDENTITY_HEADER, axum::http::HeaderValue::from_static("1"));
            }
            response
        }
        Decision::Allow => {
            if let Some(resolved) = resolved {
                crate::error::set_sentry_user(&resolved.caller.identity.id);
                request.extensions_mut().insert(resolved.caller);
            }
            let response = next.run(request).await;
            if handler_set_session(&response) {
                response
            } else {
                (jar, response).into_response()
            }
        }
    }
}

/// The handler already wrote the session cookie (sign-in or sign-out).
fn handler_set_session(response: &Response) -> bool {
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}
