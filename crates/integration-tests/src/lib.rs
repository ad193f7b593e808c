//! Integration tests for Psicofinders.
//!
//! Every test talks HTTP to running binaries and is `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p psicofinders-cli -- migrate
//! cargo run -p psicofinders-site &
//! cargo run -p psicofinders-admin &
//! ADMIN_TEST_PASSWORD=... cargo test -p psicofinders-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_BASE_URL` - default `http://localhost:3000`
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `ADMIN_TEST_PASSWORD` - plaintext matching the admin's `ADMIN_PASSWORD_HASH`
//!
//! The intake endpoint allows a burst of three posts per client; the suites
//! together stay within it.

use reqwest::header::{HeaderMap, LOCATION, SET_COOKIE};
use reqwest::{Client, redirect};

/// Base URL of the public site.
#[must_use]
pub fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the backoffice.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Plaintext admin password, when provided for the run.
#[must_use]
pub fn admin_test_password() -> Option<String> {
    std::env::var("ADMIN_TEST_PASSWORD")
        .ok()
        .filter(|v| !v.is_empty())
}

/// Client that does not follow redirects, so tests can assert on them.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(headers: &HeaderMap) -> Option<&str> {
    headers.get(LOCATION).and_then(|v| v.to_str().ok())
}

/// `name=value` of the first `Set-Cookie` for `name`.
///
/// The admin cookie is `Secure`, which a cookie store will not replay over
/// plain http, so tests forward it by hand.
#[must_use]
pub fn cookie_pair(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

/// Minimal valid intake payload with a unique email.
#[must_use]
pub fn intake_payload() -> serde_json::Value {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    serde_json::json!({
        "name": "Prueba Integración",
        "email": format!("it-{tag}@example.org"),
        "city": "Zaragoza",
        "country": "España",
        "colegiado": format!("IT-{}", tag.chars().take(8).collect::<String>()),
        "modality": "online",
        "langs": ["es"],
        "priceMin": "45",
        "priceMax": "70",
        "availability": {"from": "09:00", "to": "14:00", "mon": true, "wed": true},
        "notes": "Alta de prueba\nsegunda línea",
        "uiLang": "es",
        "source": "integration-tests"
    })
}
