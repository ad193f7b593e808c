//! Application listing and CSV export.

use askama::Template;
use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{Html, IntoResponse},
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::db::{ApplicationRecord, ApplicationRepository, applications::LIST_LIMIT};
use crate::error::Result;
use crate::filters;
use crate::services::export;
use crate::state::AppState;

/// One table row on the home page.
#[derive(Debug, Clone)]
pub struct ApplicationView {
    pub submitted_at: String,
    pub name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub colegiado: String,
    pub modality: String,
    pub langs: String,
    pub price: String,
}

impl From<&ApplicationRecord> for ApplicationView {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            submitted_at: record.submitted_at.format("%d/%m/%Y %H:%M").to_string(),
            name: record.name.clone(),
            email: record.email.clone(),
            city: record.city.clone(),
            country: record.country.clone(),
            colegiado: record.colegiado.clone(),
            modality: record.modality.to_uppercase(),
            langs: record.langs.join(", "),
            price: price_range(record.price_min, record.price_max),
        }
    }
}

/// `40–90`, with either side blank when unset.
fn price_range(min: Option<Decimal>, max: Option<Decimal>) -> String {
    let side = |v: Option<Decimal>| v.map(|d| d.normalize().to_string()).unwrap_or_default();
    format!("{}–{}", side(min), side(max))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    limit: i64,
    applications: Vec<ApplicationView>,
}

/// GET /admin
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let records = ApplicationRepository::new(state.pool()?).list_recent().await?;
    let template = IndexTemplate {
        limit: LIST_LIMIT,
        applications: records.iter().map(ApplicationView::from).collect(),
    };
    Ok(Html(template.render()?))
}

/// GET /admin/export
#[instrument(skip(state))]
pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let records = ApplicationRepository::new(state.pool()?).for_export().await?;
    let body = export::to_csv(&records);
    tracing::info!(rows = records.len(), "Applications exported");

    let disposition = format!(
        "attachment; filename={}",
        export::filename(Utc::now().date_naive())
    );
    Ok((
        [
            (CONTENT_TYPE, export::CONTENT_TYPE.to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_view_formatting() {
        let record = ApplicationRecord {
            id: Uuid::nil(),
            submitted_at: Utc.with_ymd_and_hms(2024, 11, 3, 18, 5, 0).unwrap(),
            name: "Jordi Puig".into(),
            email: "jordi@example.org".into(),
            phone: None,
            city: "Girona".into(),
            country: "España".into(),
            colegiado: "CAT-9".into(),
            experience: None,
            website: None,
            modality: "inperson".into(),
            langs: vec!["ca".into(), "es".into()],
            approaches: Vec::new(),
            specialties: Vec::new(),
            price_min: None,
            price_max: Some(Decimal::new(7000, 2)),
            availability: None,
            notes: None,
            ui_lang: "es".into(),
            source: "landing-pro-mvp".into(),
        };
        let view = ApplicationView::from(&record);
        assert_eq!(view.submitted_at, "03/11/2024 18:05");
        assert_eq!(view.modality, "INPERSON");
        assert_eq!(view.langs, "ca, es");
        assert_eq!(view.price, "–70");
    }

    #[test]
    fn test_price_range() {
        assert_eq!(price_range(Some(Decimal::new(40, 0)), Some(Decimal::new(90, 0))), "40–90");
        assert_eq!(price_range(None, None), "–");
    }
}
