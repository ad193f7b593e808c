//! Preview of the caller's public profile card.

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
#[template(path = "pro/preview.html")]
pub struct PreviewTemplate {
    pub current_path: &'static str,
    pub profile: TherapistProfile,
    pub fees: Option<String>,
    pub location: Option<String>,
}

/// `Lleida, España`, or whichever part is known.
fn location(profile: &TherapistProfile) -> Option<String> {
    let parts: Vec<&str> = [profile.city.as_deref(), profile.country.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// GET /pro/preview
#[instrument(skip_all)]
pub async fn page(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
) -> Result<PreviewTemplate, AppError> {
    let profile = own_profile(&state, &caller.identity).await?;
    Ok(PreviewTemplate {
        current_path: "/pro/preview",
        fees: profile.fees.display(),
        location: location(&profile),
        profile,
    })
}
