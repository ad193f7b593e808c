//! Application intake API.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::db::ApplicationRepository;
use crate::error::AppError;
use crate::services::intake::{self, InviteOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub env: EnvStatus,
}

/// Which optional settings are present.
#[derive(Debug, Serialize)]
pub struct EnvStatus {
    pub database: bool,
    pub identity: bool,
    pub site: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub invited: InviteOutcome,
}

/// Report whether intake is fully configured.
///
/// GET /api/therapists
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ok: true,
        env: EnvStatus {
            database: state.has_database(),
            identity: state.identity().is_some(),
            site: state.config().site_url.is_some(),
        },
    })
}

/// Store an application and invite the applicant.
///
/// POST /api/therapists
///
/// Answers 201 `{"ok": true, "invited": ...}`; validation failures are 400
/// `{"error": "Missing field: <name>"}`.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return AppError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
                .into_json_response();
        }
    };

    let application = match intake::normalize(&body, chrono::Utc::now()) {
        Ok(application) => application,
        Err(e) => return AppError::BadRequest(e.to_string()).into_json_response(),
    };

    let pool = match state.pool() {
        Ok(pool) => pool,
        Err(e) => return AppError::from(e).into_json_response(),
    };

    let id = match ApplicationRepository::new(pool).insert(&application).await {
        Ok(id) => id,
        Err(e) => return AppError::from(e).into_json_response(),
    };
    tracing::info!(application_id = %id, "Application stored");

    let config = state.config();
    let invited = if config.auto_invite {
        let redirect_to = config.callback_url();
        intake::invite_applicant(state.identity(), redirect_to.as_deref(), &application).await
    } else {
        InviteOutcome::Skipped
    };
    tracing::info!(application_id = %id, invited = ?invited, "Intake complete");

    (
        StatusCode::CREATED,
        Json(SubmitResponse { ok: true, invited }),
    )
        .into_response()
}
