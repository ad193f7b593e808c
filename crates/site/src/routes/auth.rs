//! Sign-in, identity-provider callback and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use psicofinders_core::gate::{DASHBOARD_PATH, LOGIN_PATH, safe_next};

use super::found;
use crate::db::TherapistRepository;
use crate::filters;
use crate::middleware::session::{read_session, removal_cookie, session_cookie};
use crate::models::{Identity, ProviderSession};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Email o contraseña incorrectos.";
const IDENTITY_MISSING: &str = "El acceso de profesionales no está configurado.";
const IDENTITY_UNREACHABLE: &str = "No se pudo contactar con el servicio de acceso. Inténtalo de nuevo.";

/// Token lifetime assumed when the fragment does not carry `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pro/login.html")]
pub struct LoginTemplate {
    pub next: Option<String>,
    pub email: String,
    pub error: Option<String>,
}

/// Display the login form.
///
/// GET /pro/login
pub async fn login_page(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Response {
    LoginTemplate {
        next: query.next,
        email: String::new(),
        error: state.identity().is_none().then(|| IDENTITY_MISSING.to_owned()),
    }
    .into_response()
}

/// Sign in with email and password, then return to `next`.
///
/// POST /pro/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let render = |status: StatusCode, message: &str, form: LoginForm| {
        (
            status,
            LoginTemplate {
                next: form.next,
                email: form.email,
                error: Some(message.to_owned()),
            },
        )
            .into_response()
    };

    let Some(client) = state.identity() else {
        return render(StatusCode::SERVICE_UNAVAILABLE, IDENTITY_MISSING, form);
    };

    match client
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
    {
        Ok(session) => {
            let jar = jar.add(session_cookie(&session, state.config().secure_cookies()));
            tracing::info!("Pro signed in");
            (jar, found(&safe_next(form.next.as_deref()))).into_response()
        }
        Err(e) if e.is_rejection() => {
            tracing::info!(error = %e, "Sign-in rejected");
            render(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS, form)
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-in failed");
            render(StatusCode::BAD_GATEWAY, IDENTITY_UNREACHABLE, form)
        }
    }
}

// =============================================================================
// Callback
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Tokens read from the URL fragment by `static/js/callback.js`.
#[derive(Debug, Deserialize)]
pub struct CallbackTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
}

/// Callback page: either an error message or the fragment bootstrap.
#[derive(Template, WebTemplate)]
#[template(path = "auth/callback.html")]
pub struct CallbackTemplate {
    pub error: Option<String>,
}

fn callback_error(status: StatusCode, detail: &str) -> Response {
    (
        status,
        CallbackTemplate {
            error: Some(format!("Error al completar el inicio de sesión: {detail}")),
        },
    )
        .into_response()
}

/// Identity-provider callback.
///
/// GET /auth/callback
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        let detail = query.error_description.as_deref().unwrap_or(error);
        return callback_error(StatusCode::BAD_REQUEST, detail);
    }

    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return CallbackTemplate { error: None }.into_response();
    };

    let Some(client) = state.identity() else {
        return callback_error(StatusCode::SERVICE_UNAVAILABLE, IDENTITY_MISSING);
    };

    match client.exchange_code(code).await {
        Ok(session) => finish_sign_in(&state, jar, session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Code exchange failed");
            callback_error(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// Fragment tokens posted back by the callback page.
///
/// POST /auth/callback
#[instrument(skip_all)]
pub async fn callback_tokens(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(tokens): Form<CallbackTokens>,
) -> Response {
    if state.identity().is_none() {
        return callback_error(StatusCode::SERVICE_UNAVAILABLE, IDENTITY_MISSING);
    }

    let session = ProviderSession::issued(
        tokens.access_token,
        tokens.refresh_token,
        tokens.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        Utc::now(),
    );
    finish_sign_in(&state, jar, session).await
}

/// Verify the session with the provider, store it and send the caller to
/// their home page.
async fn finish_sign_in(state: &AppState, jar: PrivateCookieJar, session: ProviderSession) -> Response {
    let Some(client) = state.identity() else {
        return callback_error(StatusCode::SERVICE_UNAVAILABLE, IDENTITY_MISSING);
    };

    let identity = match client.get_user(&session.access_token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = %e, "Callback session rejected");
            return callback_error(StatusCode::UNAUTHORIZED, "No se pudo crear la sesión");
        }
    };

    let destination = home_path(state, &identity).await;
    tracing::info!(therapist_id = %identity.id, destination, "Pro signed in via callback");

    let jar = jar.add(session_cookie(&session, state.config().secure_cookies()));
    (jar, found(destination)).into_response()
}

/// Dashboard when onboarding is complete, onboarding otherwise. A failed
/// lookup goes to the dashboard and lets the gate decide.
async fn home_path(state: &AppState, identity: &Identity) -> &'static str {
    let pool = match state.pool() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Onboarding lookup skipped");
            return DASHBOARD_PATH;
        }
    };
    match TherapistRepository::new(pool, identity).onboarding_state().await {
        Ok(onboarding) => onboarding.home_path(),
        Err(e) => {
            tracing::warn!(error = %e, "Onboarding lookup failed");
            DASHBOARD_PATH
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out at the provider (best effort) and clear the cookie.
///
/// POST /pro/logout
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    if let (Some(client), Some(session)) = (state.identity(), read_session(&jar))
        && let Err(e) = client.sign_out(&session.access_token).await
    {
        tracing::warn!(error = %e, "Provider sign-out failed");
    }

    let jar = jar.remove(removal_cookie());
    (jar, found(LOGIN_PATH)).into_response()
}
