//! Pro dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use super::own_profile;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequirePro;
use crate::models::TherapistProfile;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "pro/dashboard.html")]
pub struct DashboardTemplate {
    pub current_path: &'static str,
    pub profile: TherapistProfile,
    pub fees: Option<String>,
    /// Days with at least one slot.
    pub active_days: Vec<&'static str>,
}

/// Summary of the caller's profile with links to each editor.
///
/// GET /pro/dashboard
#[instrument(skip_all)]
pub async fn page(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
) -> Result<DashboardTemplate, AppError> {
    let profile = own_profile(&state, &caller.identity).await?;

    let active_days = profile
        .availability
        .iter()
        .filter(|(_, slots)| !slots.is_empty())
        .map(|(day, _)| day.label())
        .collect();

    Ok(DashboardTemplate {
        current_path: "/pro/dashboard",
        fees: profile.fees.display(),
        active_days,
        profile,
    })
}
