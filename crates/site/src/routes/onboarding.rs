//! Onboarding: the minimum profile needed before the dashboard opens.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use tracing::instrument;

use psicofinders_core::gate::DASHBOARD_PATH;
use psicofinders_core::{Languages, Modality};

use super::forms::{LangOption, ModalityOption, lang_options, modality_options, required};
use super::found;
use crate::db::TherapistRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequirePro;
use crate::models::OnboardingSubmission;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "pro/onboarding.html")]
pub struct OnboardingTemplate {
    pub name: String,
    pub colegiado: String,
    pub modalities: Vec<ModalityOption>,
    pub langs: Vec<LangOption>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OnboardingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub colegiado: String,
    pub modality: Option<String>,
    #[serde(default)]
    pub langs: Vec<String>,
}

impl OnboardingForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the message for the first invalid field.
    pub fn validate(&self) -> Result<OnboardingSubmission, String> {
        let name = required(&self.name, "Indica tu nombre y apellidos.")?;
        let colegiado = required(&self.colegiado, "Indica tu número de colegiado.")?;
        let modality = self
            .modality
            .as_deref()
            .unwrap_or_default()
            .parse::<Modality>()
            .map_err(|_| "Elige una modalidad.".to_owned())?;
        let langs =
            Languages::new(&self.langs).map_err(|_| "Selecciona al menos un idioma.".to_owned())?;
        Ok(OnboardingSubmission {
            name,
            colegiado,
            modality,
            langs,
        })
    }

    fn render(&self, error: Option<String>) -> OnboardingTemplate {
        OnboardingTemplate {
            name: self.name.clone(),
            colegiado: self.colegiado.clone(),
            modalities: modality_options(self.modality.as_deref().and_then(|m| m.parse().ok())),
            langs: lang_options(&Languages::ONBOARDING_OPTIONS, &self.langs),
            error,
        }
    }
}

/// Display the onboarding form, prefilled from an existing row.
///
/// GET /pro/onboarding
#[instrument(skip_all)]
pub async fn page(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let profile = TherapistRepository::new(state.pool()?, &caller.identity)
        .get_profile()
        .await?;

    let form = match profile {
        Some(profile) if profile.onboarding_complete => return Ok(found(DASHBOARD_PATH)),
        Some(profile) => OnboardingForm {
            name: profile.name.unwrap_or_default(),
            colegiado: profile.colegiado.unwrap_or_default(),
            modality: Some(profile.modality.unwrap_or(Modality::Online).as_str().to_owned()),
            langs: if profile.langs.is_empty() {
                vec!["es".to_owned()]
            } else {
                profile.langs
            },
        },
        None => OnboardingForm {
            modality: Some(Modality::Online.as_str().to_owned()),
            langs: vec!["es".to_owned()],
            ..OnboardingForm::default()
        },
    };

    Ok(form.render(None).into_response())
}

/// Save the profile and mark onboarding complete.
///
/// POST /pro/onboarding
#[instrument(skip_all)]
pub async fn submit(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Form(form): Form<OnboardingForm>,
) -> Result<Response, AppError> {
    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(message) => {
            return Ok((StatusCode::BAD_REQUEST, form.render(Some(message))).into_response());
        }
    };

    TherapistRepository::new(state.pool()?, &caller.identity)
        .complete_onboarding(&submission)
        .await?;
    tracing::info!(therapist_id = %caller.identity.id, "Onboarding complete");

    Ok(found(DASHBOARD_PATH))
}
