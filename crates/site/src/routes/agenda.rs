//! Weekly availability editor.
//!
//! The form has [`MAX_SLOTS_PER_DAY`] rows per day, posted as repeated
//! `<day>_start` / `<day>_end` fields in row order. Rows left blank on both
//! sides are dropped; everything else must pass [`Availability::validate`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use psicofinders_core::{Availability, AvailabilityError, DayKey, MAX_SLOTS_PER_DAY, TimeSlot};

use super::{SavedQuery, found, own_profile};
use crate::db::TherapistRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequirePro;
use crate::state::AppState;

const SAVED_PATH: &str = "/pro/agenda?saved=1";

/// One editable row; both sides may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotRow {
    pub start: String,
    pub end: String,
}

impl SlotRow {
    fn is_blank(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AgendaDay {
    pub key: &'static str,
    pub label: &'static str,
    pub rows: Vec<SlotRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pro/agenda.html")]
pub struct AgendaTemplate {
    pub current_path: &'static str,
    pub days: Vec<AgendaDay>,
    pub error: Option<String>,
    pub saved: bool,
}

impl AgendaTemplate {
    fn new(days: Vec<AgendaDay>, error: Option<String>, saved: bool) -> Self {
        Self {
            current_path: "/pro/agenda",
            days,
            error,
            saved,
        }
    }
}

/// Rows for the form, padded to [`MAX_SLOTS_PER_DAY`] per day.
fn days_from_availability(availability: &Availability) -> Vec<AgendaDay> {
    availability
        .iter()
        .map(|(day, slots)| AgendaDay {
            key: day.as_str(),
            label: day.label(),
            rows: pad(
                slots
                    .iter()
                    .map(|s| SlotRow {
                        start: s.start.clone(),
                        end: s.end.clone(),
                    })
                    .collect(),
            ),
        })
        .collect()
}

fn pad(mut rows: Vec<SlotRow>) -> Vec<SlotRow> {
    while rows.len() < MAX_SLOTS_PER_DAY {
        rows.push(SlotRow::default());
    }
    rows
}

/// Group posted fields into rows per day, in form order. Unknown fields are ignored.
#[must_use]
pub fn collect_rows(pairs: &[(String, String)]) -> Vec<AgendaDay> {
    DayKey::ALL
        .into_iter()
        .map(|day| {
            let values = |suffix: &str| -> Vec<String> {
                let key = format!("{}_{suffix}", day.as_str());
                pairs
                    .iter()
                    .filter(|(k, _)| *k == key)
                    .map(|(_, v)| v.trim().to_owned())
                    .collect()
            };
            let starts = values("start");
            let ends = values("end");
            let rows = (0..starts.len().max(ends.len()))
                .map(|i| SlotRow {
                    start: starts.get(i).cloned().unwrap_or_default(),
                    end: ends.get(i).cloned().unwrap_or_default(),
                })
                .collect();
            AgendaDay {
                key: day.as_str(),
                label: day.label(),
                rows,
            }
        })
        .collect()
}

/// Build and validate the weekly availability from the posted form.
///
/// # Errors
///
/// Returns the first [`AvailabilityError`], scanning `mon` to `sun`.
pub fn parse_agenda(pairs: &[(String, String)]) -> Result<Availability, AvailabilityError> {
    let mut availability = Availability::default();
    for (day, rows) in DayKey::ALL.into_iter().zip(collect_rows(pairs)) {
        let slots = rows
            .rows
            .into_iter()
            .filter(|row| !row.is_blank())
            .map(|row| TimeSlot::new(row.start, row.end))
            .collect();
        availability.set_day(day, slots);
    }
    availability.validate()?;
    Ok(availability)
}

/// Message shown on the form for a rejected availability.
#[must_use]
pub fn agenda_error_message(error: &AvailabilityError) -> String {
    let label = error.day().label();
    match error {
        AvailabilityError::TooManySlots { .. } => {
            format!("{label}: máximo {MAX_SLOTS_PER_DAY} franjas por día.")
        }
        AvailabilityError::InvalidTime { .. } => {
            format!("{label}: indica la hora de inicio y de fin (HH:MM).")
        }
        AvailabilityError::StartNotBeforeEnd { .. } => {
            format!("{label}: la franja debe empezar antes de terminar.")
        }
    }
}

/// Display the weekly availability.
///
/// GET /pro/agenda
#[instrument(skip_all)]
pub async fn page(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Query(query): Query<SavedQuery>,
) -> Result<AgendaTemplate, AppError> {
    let profile = own_profile(&state, &caller.identity).await?;
    Ok(AgendaTemplate::new(
        days_from_availability(&profile.availability),
        None,
        query.is_saved(),
    ))
}

/// Replace the weekly availability.
///
/// POST /pro/agenda
#[instrument(skip_all)]
pub async fn submit(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let availability = match parse_agenda(&pairs) {
        Ok(availability) => availability,
        Err(e) => {
            tracing::debug!(error = %e, "Availability rejected");
            let days = collect_rows(&pairs)
                .into_iter()
                .map(|day| AgendaDay {
                    rows: pad(day.rows),
                    ..day
                })
                .collect();
            let template = AgendaTemplate::new(days, Some(agenda_error_message(&e)), false);
            return Ok((StatusCode::BAD_REQUEST, template).into_response());
        }
    };

    TherapistRepository::new(state.pool()?, &caller.identity)
        .update_availability(&availability)
        .await?;
    tracing::info!(therapist_id = %caller.identity.id, "Availability updated");

    Ok(found(SAVED_PATH))
}
