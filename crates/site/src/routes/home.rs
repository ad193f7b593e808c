//! Landing page for professionals.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use psicofinders_core::{DayKey, Languages};

use super::forms::{LangOption, ModalityOption, lang_options, modality_options};
use crate::filters;

pub const LANDING_PATH: &str = "/pros";

const APPROACHES: [&str; 8] = [
    "TCC",
    "EMDR",
    "ACT",
    "Sistémica",
    "Psicodinámica",
    "Humanista",
    "Gestalt",
    "Mindfulness",
];

const SPECIALTIES: [&str; 10] = [
    "Ansiedad",
    "Estado de ánimo / Depresión",
    "Trauma",
    "Pareja / Familia",
    "Infanto-juvenil",
    "Adicciones",
    "Duelo",
    "TDAH",
    "Identidad / Diversidad",
    "Estrés laboral",
];

/// Landing page template. The form is posted as JSON by `static/js/intake.js`.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub langs: Vec<LangOption>,
    pub modalities: Vec<ModalityOption>,
    pub approaches: &'static [&'static str],
    pub specialties: &'static [&'static str],
    pub days: [DayKey; 7],
}

/// Display the landing page.
///
/// GET /pros
pub async fn landing() -> impl IntoResponse {
    LandingTemplate {
        langs: lang_options(&Languages::ONBOARDING_OPTIONS, &["es".to_owned()]),
        modalities: modality_options(Some(psicofinders_core::Modality::InPerson)),
        approaches: &APPROACHES,
        specialties: &SPECIALTIES,
        days: DayKey::ALL,
    }
}
