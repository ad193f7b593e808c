//! Psicofinders backoffice.
//!
//! One shared password protects everything under `/admin`. The binary in
//! `main.rs` loads configuration, installs logging and serves [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use middleware::{admin_gate, request_id_middleware, security_headers_middleware};
use state::AppState;

/// Build the admin router with its middleware stack, minus the Sentry layers
/// which `main` adds outermost.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(from_fn_with_state(state.clone(), admin_gate))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable when no database is configured or it is
/// not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Ok(pool) = state.pool() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::tests::{TEST_PASSWORD, test_config};
    use crate::middleware::ADMIN_COOKIE;

    fn test_app() -> Router {
        app(AppState::new(test_config(), None))
    }

    fn authorize_request(body: &str) -> Request<Body> {
        Request::post("/admin/login/authorize")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    fn set_cookies(response: &axum::response::Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    /// Sign in and return the `name=value` pair of the issued cookie.
    async fn signed_in_cookie(app: Router) -> String {
        let response = app
            .oneshot(authorize_request(&format!("password={TEST_PASSWORD}")))
            .await
            .unwrap();
        let cookie = set_cookies(&response).into_iter().next().unwrap();
        cookie.split(';').next().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_correct_password_sets_cookie() {
        let response = test_app()
            .oneshot(authorize_request(&format!("password={TEST_PASSWORD}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/admin");

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        let cookie = &cookies[0];
        assert!(cookie.starts_with(&format!("{ADMIN_COOKIE}=")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[tokio::test]
    async fn test_wrong_password_redirects_without_cookie() {
        let response = test_app()
            .oneshot(authorize_request("password=nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/admin/login?err=1");
        assert!(set_cookies(&response).is_empty());
    }

    #[tokio::test]
    async fn test_missing_hash_rejects_everything() {
        let mut config = test_config();
        config.password_hash = None;
        let response = app(AppState::new(config, None))
            .oneshot(authorize_request(&format!("password={TEST_PASSWORD}")))
            .await
            .unwrap();
        assert_eq!(location(&response), "/admin/login?err=1");
        assert!(set_cookies(&response).is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_redirects() {
        let request = Request::post("/admin/login/authorize")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/admin/login?err=1");
    }

    #[tokio::test]
    async fn test_gate_redirects_anonymous() {
        for path in ["/admin", "/admin/export"] {
            let response = test_app()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FOUND, "{path}");
            assert_eq!(location(&response), "/admin/login?err=1");
        }
    }

    #[tokio::test]
    async fn test_gate_rejects_forged_cookie() {
        let digest = psicofinders_core::AdminDigest::of(TEST_PASSWORD);
        let forged = format!("{ADMIN_COOKIE}={}", digest.as_str());
        let response = test_app()
            .oneshot(
                Request::get("/admin")
                    .header(header::COOKIE, forged)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(location(&response), "/admin/login?err=1");
    }

    #[tokio::test]
    async fn test_signed_cookie_passes_gate() {
        let app = test_app();
        let cookie = signed_in_cookie(app.clone()).await;
        // No database in tests: passing the gate surfaces as a 500 from the handler.
        let response = app
            .oneshot(
                Request::get("/admin")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Database not configured");
    }

    #[tokio::test]
    async fn test_login_page() {
        let response = test_app()
            .oneshot(Request::get("/admin/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Acceso al backoffice"));
        assert!(!html.contains("Credenciales no válidas"));

        let response = test_app()
            .oneshot(Request::get("/admin/login?err=1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Credenciales no válidas"));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let app = test_app();
        let cookie = signed_in_cookie(app.clone()).await;
        let response = app
            .oneshot(
                Request::post("/admin/logout")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/admin/login");
        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with(&format!("{ADMIN_COOKIE}=;"))));
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(location(&response), "/admin");

        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers().get("x-robots-tag").unwrap(),
            "noindex, nofollow"
        );

        let response = test_app()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
