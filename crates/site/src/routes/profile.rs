//! Profile editor.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use tracing::instrument;

use psicofinders_core::{Languages, Modality};

use super::forms::{LangOption, ModalityOption, lang_options, modality_options, optional, required};
use super::{SavedQuery, found, own_profile};
use crate::db::TherapistRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequirePro;
use crate::models::{ProfileUpdate, TherapistProfile};
use crate::state::AppState;

const SAVED_PATH: &str = "/pro/perfil?saved=1";

#[derive(Template, WebTemplate)]
#[template(path = "pro/perfil.html")]
pub struct ProfileTemplate {
    pub current_path: &'static str,
    pub form: ProfileForm,
    pub modalities: Vec<ModalityOption>,
    pub langs: Vec<LangOption>,
    pub error: Option<String>,
    pub saved: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub colegiado: String,
    pub modality: Option<String>,
    #[serde(default)]
    pub langs: Vec<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub phone: String,
}

impl From<TherapistProfile> for ProfileForm {
    fn from(profile: TherapistProfile) -> Self {
        Self {
            name: profile.name.unwrap_or_default(),
            colegiado: profile.colegiado.unwrap_or_default(),
            modality: Some(profile.modality.unwrap_or(Modality::Online).as_str().to_owned()),
            langs: if profile.langs.is_empty() {
                vec!["es".to_owned()]
            } else {
                profile.langs
            },
            city: profile.city.unwrap_or_default(),
            country: profile.country.unwrap_or_default(),
            website: profile.website.unwrap_or_default(),
            phone: profile.phone.unwrap_or_default(),
        }
    }
}

impl ProfileForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the message for the first invalid field.
    pub fn validate(&self) -> Result<ProfileUpdate, String> {
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
        let website = optional(Some(&self.website));
        if website
            .as_deref()
            .is_some_and(|w| !(w.starts_with("https://") || w.starts_with("http://")))
        {
            return Err("La web debe empezar por https://".to_owned());
        }

        Ok(ProfileUpdate {
            name,
            colegiado,
            modality,
            langs,
            city: optional(Some(&self.city)),
            country: optional(Some(&self.country)),
            website,
            phone: optional(Some(&self.phone)),
        })
    }

    fn render(self, error: Option<String>, saved: bool) -> ProfileTemplate {
        ProfileTemplate {
            current_path: "/pro/perfil",
            modalities: modality_options(self.modality.as_deref().and_then(|m| m.parse().ok())),
            langs: lang_options(&Languages::PROFILE_OPTIONS, &self.langs),
            form: self,
            error,
            saved,
        }
    }
}

/// Display the profile form.
///
/// GET /pro/perfil
#[instrument(skip_all)]
pub async fn page(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Query(query): Query<SavedQuery>,
) -> Result<ProfileTemplate, AppError> {
    let profile = own_profile(&state, &caller.identity).await?;
    Ok(ProfileForm::from(profile).render(None, query.is_saved()))
}

/// Save the identity fields.
///
/// POST /pro/perfil
#[instrument(skip_all)]
pub async fn submit(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let update = match form.validate() {
        Ok(update) => update,
        Err(message) => {
            return Ok((StatusCode::BAD_REQUEST, form.render(Some(message), false)).into_response());
        }
    };

    TherapistRepository::new(state.pool()?, &caller.identity)
        .update_profile(&update)
        .await?;
    tracing::info!(therapist_id = %caller.identity.id, "Profile updated");

    Ok(found(SAVED_PATH))
}
