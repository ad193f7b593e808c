//! Fee range editor.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use psicofinders_core::{FeeRange, FeeRangeError};

use super::{SavedQuery, found, own_profile};
use crate::db::TherapistRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequirePro;
use crate::state::AppState;

const SAVED_PATH: &str = "/pro/honorarios?saved=1";

#[derive(Template, WebTemplate)]
#[template(path = "pro/honorarios.html")]
pub struct FeesTemplate {
    pub current_path: &'static str,
    pub price_min: String,
    pub price_max: String,
    pub error: Option<String>,
    pub saved: bool,
}

#[derive(Debug, Deserialize)]
pub struct FeesForm {
    #[serde(default)]
    pub price_min: String,
    #[serde(default)]
    pub price_max: String,
}

/// Message shown on the form for a rejected range.
#[must_use]
pub fn fee_error_message(error: &FeeRangeError) -> String {
    match error {
        FeeRangeError::MinAboveMax => "El mínimo no puede ser mayor que el máximo.".to_owned(),
        FeeRangeError::Negative => "Los honorarios no pueden ser negativos.".to_owned(),
        FeeRangeError::InvalidAmount(value) => format!("Importe no válido: {value}"),
    }
}

/// Display the fee form.
///
/// GET /pro/honorarios
#[instrument(skip_all)]
pub async fn page(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Query(query): Query<SavedQuery>,
) -> Result<FeesTemplate, AppError> {
    let profile = own_profile(&state, &caller.identity).await?;
    let amount = |v: Option<rust_decimal::Decimal>| v.map(|d| d.normalize().to_string()).unwrap_or_default();

    Ok(FeesTemplate {
        current_path: "/pro/honorarios",
        price_min: amount(profile.fees.min()),
        price_max: amount(profile.fees.max()),
        error: None,
        saved: query.is_saved(),
    })
}

/// Save the fee range. An inverted range is rejected before anything is stored.
///
/// POST /pro/honorarios
#[instrument(skip_all)]
pub async fn submit(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Form(form): Form<FeesForm>,
) -> Result<Response, AppError> {
    let fees = match FeeRange::parse(&form.price_min, &form.price_max) {
        Ok(fees) => fees,
        Err(e) => {
            tracing::debug!(error = %e, "Fee range rejected");
            let template = FeesTemplate {
                current_path: "/pro/honorarios",
                error: Some(fee_error_message(&e)),
                price_min: form.price_min,
                price_max: form.price_max,
                saved: false,
            };
            return Ok((StatusCode::BAD_REQUEST, template).into_response());
        }
    };

    TherapistRepository::new(state.pool()?, &caller.identity)
        .update_fees(&fees)
        .await?;
    tracing::info!(therapist_id = %caller.identity.id, "Fees updated");

    Ok(found(SAVED_PATH))
}
