//! A normalized intake submission ready to be stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use psicofinders_core::{Email, Modality};

/// One application row, after required-field checks and truncation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewApplication {
    pub submitted_at: DateTime<Utc>,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub city: String,
    pub country: String,
    pub colegiado: String,
    pub experience: Option<Decimal>,
    pub website: Option<String>,
    pub modality: Modality,
    pub langs: Vec<String>,
    pub approaches: Vec<String>,
    pub specialties: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    /// Stored exactly as submitted.
    pub availability: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub ui_lang: String,
    pub source: String,
}
