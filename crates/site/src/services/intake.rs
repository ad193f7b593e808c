//! Application intake: normalization of the landing-page JSON and the
//! follow-up invitation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use psicofinders_core::{Email, EmailError, Modality};

use super::identity::IdentityClient;
use crate::models::NewApplication;

const DEFAULT_UI_LANG: &str = "es";
const DEFAULT_SOURCE: &str = "landing-pro-mvp";

/// Required keys, checked in this order.
const REQUIRED: [&str; 6] = ["name", "email", "city", "country", "colegiado", "langs"];

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field: email")]
    InvalidEmail(#[source] EmailError),
}

/// Turn a submitted JSON body into a storable application.
///
/// Non-object bodies behave like an empty object.
///
/// # Errors
///
/// - [`IntakeError::MissingField`] for the first required key that is absent or empty
/// - [`IntakeError::InvalidEmail`] if the address does not look like an email
pub fn normalize(body: &Value, now: DateTime<Utc>) -> Result<NewApplication, IntakeError> {
    let empty = Map::new();
    let body = body.as_object().unwrap_or(&empty);

    for key in REQUIRED {
        let present = match body.get(key) {
            Some(Value::Array(items)) if key == "langs" => !items.is_empty(),
            Some(_) if key == "langs" => false,
            Some(value) => is_present(value),
            None => false,
        };
        if !present {
            return Err(IntakeError::MissingField(key));
        }
    }

    let email = text(body, "email", 200).unwrap_or_default();
    let email = Email::parse(&email).map_err(IntakeError::InvalidEmail)?;

    Ok(NewApplication {
        submitted_at: now,
        name: text(body, "name", 200).unwrap_or_default(),
        email,
        phone: text(body, "phone", 50),
        city: text(body, "city", 120).unwrap_or_default(),
        country: text(body, "country", 120).unwrap_or_default(),
        colegiado: text(body, "colegiado", 120).unwrap_or_default(),
        experience: number(body.get("experience")),
        website: text(body, "website", 300),
        modality: Modality::parse_or_default(body.get("modality").and_then(Value::as_str)),
        langs: list(body.get("langs")),
        approaches: list(body.get("approaches")),
        specialties: list(body.get("specialties")),
        price_min: number(body.get("priceMin")),
        price_max: number(body.get("priceMax")),
        availability: body.get("availability").filter(|v| !v.is_null()).cloned(),
        notes: body.get("notes").filter(|v| is_present(v)).map(stringify),
        ui_lang: body
            .get("uiLang")
            .filter(|v| is_present(v))
            .map_or_else(|| DEFAULT_UI_LANG.to_owned(), stringify),
        source: body
            .get("source")
            .filter(|v| is_present(v))
            .map_or_else(|| DEFAULT_SOURCE.to_owned(), stringify),
    })
}

/// Blank strings, zero, `false` and `null` count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    }
}

fn text(body: &Map<String, Value>, key: &str, max_chars: usize) -> Option<String> {
    body.get(key)
        .filter(|v| is_present(v))
        .map(|v| stringify(v).chars().take(max_chars).collect())
}

/// Numbers pass through; numeric strings are parsed; anything else is dropped.
fn number(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) if !s.trim().is_empty() => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(stringify).collect())
        .unwrap_or_default()
}

/// What the applicant was sent after intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteOutcome {
    /// An invitation to create the account.
    Invite,
    /// The account already existed; a one-time sign-in link was sent.
    Otp,
    Skipped,
}

/// Invite the applicant to create their pro account.
///
/// Best-effort: every failure is logged and reported as
/// [`InviteOutcome::Skipped`], never as an error.
pub async fn invite_applicant(
    client: Option<&IdentityClient>,
    redirect_to: Option<&str>,
    application: &NewApplication,
) -> InviteOutcome {
    let Some(client) = client else {
        tracing::debug!("Identity provider not configured, skipping invitation");
        return InviteOutcome::Skipped;
    };

    let data = serde_json::json!({
        "name": application.name,
        "colegiado": application.colegiado,
        "city": application.city,
        "country": application.country,
        "modality": application.modality,
        "langs": application.langs,
        "source": application.source,
    });
    let email = application.email.as_str();

    match client.invite(email, redirect_to, &data).await {
        Ok(()) => InviteOutcome::Invite,
        Err(e) if e.is_already_registered() => {
            match client.send_sign_in_link(email, redirect_to).await {
                Ok(()) => InviteOutcome::Otp,
                Err(e) => {
                    tracing::warn!(error = %e, "Sign-in link after intake failed");
                    InviteOutcome::Skipped
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Invitation after intake failed");
            InviteOutcome::Skipped
        }
    }
}
