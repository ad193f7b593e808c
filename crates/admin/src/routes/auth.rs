//! Backoffice login and logout.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State, rejection::FormRejection},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::SignedCookieJar;
use psicofinders_core::gate::{ADMIN_HOME_PATH, ADMIN_LOGIN_ERROR_PATH, ADMIN_LOGIN_PATH};
use serde::Deserialize;

use super::found;
use crate::error::Result;
use crate::filters;
use crate::middleware::{admin_cookie, removal_cookie};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    err: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthorizeForm {
    #[serde(default)]
    password: String,
}

/// GET /admin/login
pub async fn login_page(Query(query): Query<LoginQuery>) -> Result<Html<String>> {
    let template = LoginTemplate {
        error: query.err.is_some(),
    };
    Ok(Html(template.render()?))
}

/// POST /admin/login/authorize
///
/// Any failure, including a malformed body or a missing password hash,
/// ends at `/admin/login?err=1` without a cookie.
pub async fn authorize(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: std::result::Result<Form<AuthorizeForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        return found(ADMIN_LOGIN_ERROR_PATH);
    };

    match state.verifier().verify(&form.password) {
        Ok(token) => {
            tracing::info!("Admin signed in");
            (jar.add(admin_cookie(token)), found(ADMIN_HOME_PATH)).into_response()
        }
        Err(_) => {
            if state.verifier().is_configured() {
                tracing::warn!("Admin login rejected");
            } else {
                tracing::warn!("Admin login attempted but ADMIN_PASSWORD_HASH is not set");
            }
            found(ADMIN_LOGIN_ERROR_PATH)
        }
    }
}

/// POST /admin/logout
pub async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), found(ADMIN_LOGIN_PATH))
}
