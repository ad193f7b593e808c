//! Pro account session cookie.
//!
//! The identity provider's tokens are stored client-side in the encrypted
//! `pf_session` cookie. Resolving the cookie always asks the provider who the
//! token belongs to; nothing about the account is trusted from the cookie.

use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;

use crate::models::session::SESSION_COOKIE;
use crate::models::{ProCaller, ProviderSession};
use crate::services::IdentityClient;

/// Cookie lifetime; the refresh token usually outlives the access token by far.
const SESSION_MAX_AGE_DAYS: i64 = 30;

/// Build the session cookie for `session`.
#[must_use]
pub fn session_cookie(session: &ProviderSession, secure: bool) -> Cookie<'static> {
    // An empty value reads back as "no session".
    let value = serde_json::to_string(session).unwrap_or_default();
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

/// Cookie that clears the session on the client.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Decode the session stored in the jar, if any.
#[must_use]
pub fn read_session(jar: &PrivateCookieJar) -> Option<ProviderSession> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
}

/// A successfully resolved session.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub caller: ProCaller,
    /// The tokens were refreshed; the cookie has to be re-issued.
    pub refreshed: bool,
}

/// Resolve a stored session to the account it belongs to.
///
/// An expired access token, or one the provider no longer accepts, is
/// refreshed once. Any failure yields `None` (anonymous).
pub async fn resolve(client: &IdentityClient, session: ProviderSession) -> Option<Resolved> {
    let mut session = session;
    let mut refreshed = false;

    if session.is_expired(Utc::now()) {
        session = refresh(client, &session).await?;
        refreshed = true;
    }

    match client.get_user(&session.access_token).await {
        Ok(identity) => Some(Resolved {
            caller: ProCaller { identity, session },
            refreshed,
        }),
        Err(e) if e.is_rejection() && !refreshed => {
            let session = refresh(client, &session).await?;
            match client.get_user(&session.access_token).await {
                Ok(identity) => Some(Resolved {
                    caller: ProCaller { identity, session },
                    refreshed: true,
                }),
                Err(e) => {
                    tracing::debug!(error = %e, "Refreshed session rejected");
                    None
                }
            }
        }
        Err(e) => {
            if !e.is_rejection() {
                tracing::warn!(error = %e, "Identity provider unavailable during session check");
            }
            None
        }
    }
}

async fn refresh(client: &IdentityClient, session: &ProviderSession) -> Option<ProviderSession> {
    match client.refresh(&session.refresh_token).await {
        Ok(fresh) => Some(fresh),
        Err(e) => {
            tracing::debug!(error = %e, "Session refresh failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::IdentityConfig;

    const USER_ID: &str = "5f0c8a9e-2c1b-4b7e-9a57-0d3f5c2a1e11";

    fn client(server: &MockServer) -> IdentityClient {
        IdentityClient::new(&IdentityConfig {
            url: server.uri(),
            anon_key: SecretString::from("anon-key"),
            service_role_key: None,
        })
        .unwrap()
    }

    fn session(access: &str, expires_in: i64) -> ProviderSession {
        ProviderSession::issued(access.into(), "refresh-0".into(), expires_in, Utc::now())
    }

    async fn mount_user(server: &MockServer, token: &str) {
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": USER_ID, "email": "ana@example.org" })),
            )
            .mount(server)
            .await;
    }

    async fn mount_refresh(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-2",
                "refresh_token": "refresh-2",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_valid_session_resolves() {
        let server = MockServer::start().await;
        mount_user(&server, "access-1").await;

        let resolved = resolve(&client(&server), session("access-1", 3600))
            .await
            .unwrap();
        assert_eq!(resolved.caller.identity.id.to_string(), USER_ID);
        assert!(!resolved.refreshed);
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed() {
        let server = MockServer::start().await;
        mount_refresh(&server).await;
        mount_user(&server, "access-2").await;

        let resolved = resolve(&client(&server), session("access-1", -10))
            .await
            .unwrap();
        assert!(resolved.refreshed);
        assert_eq!(resolved.caller.session.access_token, "access-2");
    }

    #[tokio::test]
    async fn test_revoked_token_without_refresh_is_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                serde_json::json!({ "msg": "invalid JWT" }),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({ "error_description": "Invalid Refresh Token" }),
            ))
            .mount(&server)
            .await;

        assert!(resolve(&client(&server), session("access-1", 3600)).await.is_none());
    }

    #[tokio::test]
    async fn test_provider_down_is_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(resolve(&client(&server), session("access-1", 3600)).await.is_none());
    }

    #[test]
    fn test_cookie_flags() {
        let cookie = session_cookie(&session("access-1", 3600), true);
        assert_eq!(cookie.name(), "pf_session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
