//! Integration tests for the public site and the `/pro` gate.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The site running (cargo run -p psicofinders-site)
//!
//! Run with: cargo test -p psicofinders-integration-tests -- --ignored

use psicofinders_integration_tests::{client, intake_payload, location, site_base_url};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_landing_page() {
    let resp = client()
        .get(format!("{}/pros", site_base_url()))
        .send()
        .await
        .expect("Failed to get landing");
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.expect("Failed to read response");
    assert!(html.contains("intake-form"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_intake_accepts_valid_application() {
    let resp = client()
        .post(format!("{}/api/therapists", site_base_url()))
        .json(&intake_payload())
        .send()
        .await
        .expect("Failed to submit application");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["ok"], true);
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_intake_rejects_empty_langs() {
    let mut payload = intake_payload();
    payload["langs"] = json!([]);
    let resp = client()
        .post(format!("{}/api/therapists", site_base_url()))
        .json(&payload)
        .send()
        .await
        .expect("Failed to submit application");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body, json!({"error": "Missing field: langs"}));
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_status_endpoint() {
    let resp = client()
        .get(format!("{}/api/therapists", site_base_url()))
        .send()
        .await
        .expect("Failed to get status");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["ok"], true);
    assert_eq!(body["env"]["site"], true);
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_anonymous_pro_page_redirects_to_login() {
    let resp = client()
        .get(format!("{}/pro/agenda?saved=1", site_base_url()))
        .send()
        .await
        .expect("Failed to get pro page");
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(resp.headers()),
        Some("/pro/login?next=/pro/agenda%3Fsaved%3D1")
    );
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_login_page_is_public() {
    let resp = client()
        .get(format!("{}/pro/login", site_base_url()))
        .send()
        .await
        .expect("Failed to get login page");
    assert_eq!(resp.status(), StatusCode::OK);
}
