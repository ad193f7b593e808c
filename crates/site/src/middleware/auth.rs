//! Extractor for handlers under `/pro`.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

use psicofinders_core::gate::login_redirect;

use crate::models::ProCaller;
use crate::routes::found;

/// Extractor that requires a signed-in pro account.
///
/// The `/pro` gate puts the [`ProCaller`] in request extensions; without it
/// the request is redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequirePro(caller): RequirePro) -> impl IntoResponse {
///     format!("Hola, {}", caller.identity.id)
/// }
/// ```
pub struct RequirePro(pub ProCaller);

/// Redirect to login, returning to the requested page afterwards.
pub struct LoginRedirect(String);

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        found(&self.0)
    }
}

impl<S> FromRequestParts<S> for RequirePro
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ProCaller>()
            .cloned()
            .map(Self)
            .ok_or_else(|| LoginRedirect(login_redirect(parts.uri.path(), parts.uri.query())))
    }
}
