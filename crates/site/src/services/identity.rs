//! Identity provider (Supabase Auth) client.
//!
//! Covers the calls the site needs: password sign-in, token refresh, code
//! exchange, user lookup, password change, sign-out, and the admin-side
//! invitation and one-time sign-in link used after intake.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use psicofinders_core::TherapistId;

use crate::config::IdentityConfig;
use crate::models::{Identity, ProviderSession};

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Invitations need the service role key.
    #[error("service role key not configured")]
    MissingServiceKey,

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl IdentityError {
    /// The provider refused the credentials or token (as opposed to being down).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// The provider says the account already exists.
    #[must_use]
    pub fn is_already_registered(&self) -> bool {
        match self {
            Self::Api { message, .. } => {
                let message = message.to_lowercase();
                ["already", "exist", "registered"]
                    .iter()
                    .any(|needle| message.contains(needle))
            }
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

impl TokenResponse {
    fn into_session(self) -> ProviderSession {
        ProviderSession::issued(
            self.access_token,
            self.refresh_token,
            self.expires_in,
            Utc::now(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: TherapistId,
    email: Option<String>,
}

/// Error payloads use different keys depending on the endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Identity provider API client.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    service_role_key: Option<SecretString>,
}

impl IdentityClient {
    /// Create a new client from the identity settings.
    ///
    /// # Errors
    ///
    /// Returns error if a key is not a valid header value or the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(config.anon_key.expose_secret())?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Api` with a 4xx status for wrong credentials.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, IdentityError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.token("password", &body).await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns error if the refresh token is no longer valid or the call fails.
    pub async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, IdentityError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.token("refresh_token", &body).await
    }

    /// Exchange a callback `code` for a session.
    ///
    /// # Errors
    ///
    /// Returns error if the code is invalid or expired.
    pub async fn exchange_code(&self, code: &str) -> Result<ProviderSession, IdentityError> {
        let body = serde_json::json!({ "code": code });
        self.token("authorization_code", &body).await
    }

    async fn token(
        &self,
        grant_type: &str,
        body: &serde_json::Value,
    ) -> Result<ProviderSession, IdentityError> {
        let response = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", grant_type)])
            .json(body)
            .send()
            .await?;
        let response = check(response).await?;

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;
        Ok(tokens.into_session())
    }

    /// Resolve an access token to the account it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Api` with a 4xx status for invalid or expired tokens.
    pub async fn get_user(&self, access_token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(self.url("user"))
            .bearer_auth(access_token)
            .send()
            .await?;
        let response = check(response).await?;

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;
        Ok(Identity {
            id: user.id,
            email: user.email,
        })
    }

    /// Change the password of the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the new password or the token.
    pub async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        let response = self
            .client
            .put(self.url("user"))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Revoke the session server-side.
    ///
    /// # Errors
    ///
    /// Returns error if the call fails.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.url("logout"))
            .bearer_auth(access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Invite a new account by email. Requires the service role key.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MissingServiceKey` without a service key, and
    /// `IdentityError::Api` when the provider refuses (e.g. account exists).
    pub async fn invite(
        &self,
        email: &str,
        redirect_to: Option<&str>,
        data: &serde_json::Value,
    ) -> Result<(), IdentityError> {
        let key = self
            .service_role_key
            .as_ref()
            .ok_or(IdentityError::MissingServiceKey)?;

        let mut request = self.client.post(self.url("invite"));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        let response = request
            .header("apikey", header_value(key.expose_secret())?)
            .bearer_auth(key.expose_secret())
            .json(&serde_json::json!({ "email": email, "data": data }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Send a one-time sign-in link, creating the account if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the provider refuses or the call fails.
    pub async fn send_sign_in_link(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), IdentityError> {
        let mut request = self.client.post(self.url("otp"));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        let response = request
            .json(&serde_json::json!({ "email": email, "create_user": true }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, IdentityError> {
    HeaderValue::from_str(value).map_err(|e| IdentityError::Parse(format!("invalid key: {e}")))
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error))
        .unwrap_or(text);
    Err(IdentityError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const USER_ID: &str = "5f0c8a9e-2c1b-4b7e-9a57-0d3f5c2a1e11";

    fn client(server: &MockServer, service_key: Option<&str>) -> IdentityClient {
        IdentityClient::new(&IdentityConfig {
            url: format!("{}/", server.uri()),
            anon_key: SecretString::from("anon-key"),
            service_role_key: service_key.map(SecretString::from),
        })
        .unwrap()
    }

    fn token_body() -> serde_json::Value {
        serde_json::json!({
            "access_token": "access-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-1",
            "user": { "id": USER_ID, "email": "ana@example.org" }
        })
    }

    #[tokio::test]
    async fn test_password_sign_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(body_json(
                serde_json::json!({ "email": "ana@example.org", "password": "hunter22" }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server, None)
            .sign_in_with_password("ana@example.org", "hunter22")
            .await
            .unwrap();
        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.refresh_token, "refresh-1");
        assert!(!session.is_expired(Utc::now()));
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .sign_in_with_password("ana@example.org", "nope")
            .await
            .unwrap_err();
        assert!(err.is_rejection());
        assert!(err.to_string().contains("Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_get_user_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "id": USER_ID, "email": "ana@example.org", "aud": "authenticated" }),
            ))
            .mount(&server)
            .await;

        let identity = client(&server, None).get_user("access-1").await.unwrap();
        assert_eq!(identity.id.to_string(), USER_ID);
        assert_eq!(identity.email.as_deref(), Some("ana@example.org"));
    }

    #[tokio::test]
    async fn test_refresh_and_code_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(serde_json::json!({ "refresh_token": "refresh-0" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "authorization_code"))
            .and(body_json(serde_json::json!({ "code": "abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&server)
            .await;

        let client = client(&server, None);
        assert_eq!(client.refresh("refresh-0").await.unwrap().access_token, "access-1");
        assert_eq!(client.exchange_code("abc").await.unwrap().access_token, "access-1");
    }

    #[tokio::test]
    async fn test_invite_uses_service_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/invite"))
            .and(query_param("redirect_to", "https://psicofinders.test/auth/callback"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, Some("service-key"))
            .invite(
                "ana@example.org",
                Some("https://psicofinders.test/auth/callback"),
                &serde_json::json!({ "name": "Ana" }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invite_without_service_key() {
        let server = MockServer::start().await;
        let err = client(&server, None)
            .invite("ana@example.org", None, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::MissingServiceKey));
    }

    #[tokio::test]
    async fn test_already_registered_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/invite"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "code": 422,
                "msg": "A user with this email address has already been registered"
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("service-key"))
            .invite("ana@example.org", None, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.is_already_registered());
    }

    #[test]
    fn test_other_errors_are_not_already_registered() {
        let err = IdentityError::Api {
            status: 500,
            message: "upstream timeout".into(),
        };
        assert!(!err.is_already_registered());
        assert!(!err.is_rejection());
    }
}
