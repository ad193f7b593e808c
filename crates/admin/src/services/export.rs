//! CSV export of submitted applications.
//!
//! Every field is quoted and embedded quotes are doubled. List columns are
//! joined with `|`, availability is written as compact JSON, and notes are
//! flattened to one line and cut to [`NOTES_MAX_CHARS`] characters.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::db::ApplicationRecord;

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub const NOTES_MAX_CHARS: usize = 1000;

/// Header row, in column order.
pub const COLUMNS: [&str; 19] = [
    "submitted_at",
    "name",
    "email",
    "phone",
    "city",
    "country",
    "colegiado",
    "experience",
    "website",
    "modality",
    "langs",
    "approaches",
    "specialties",
    "price_min",
    "price_max",
    "availability",
    "notes",
    "ui_lang",
    "source",
];

/// `therapists_<YYYY-MM-DD>.csv`
#[must_use]
pub fn filename(date: NaiveDate) -> String {
    format!("therapists_{}.csv", date.format("%Y-%m-%d"))
}

/// Render `records` (already ordered) as CSV, header first, one line each.
#[must_use]
pub fn to_csv(records: &[ApplicationRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(line(COLUMNS.iter().copied()));
    lines.extend(
        records
            .iter()
            .map(|record| line(row(record).iter().map(String::as_str))),
    );
    lines.join("\n")
}

fn line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
    }
    out
}

fn row(record: &ApplicationRecord) -> [String; 19] {
    [
        timestamp(record.submitted_at),
        record.name.clone(),
        record.email.clone(),
        text(record.phone.as_deref()),
        record.city.clone(),
        record.country.clone(),
        record.colegiado.clone(),
        number(record.experience),
        text(record.website.as_deref()),
        record.modality.clone(),
        record.langs.join("|"),
        record.approaches.join("|"),
        record.specialties.join("|"),
        number(record.price_min),
        number(record.price_max),
        record
            .availability
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        flatten_notes(record.notes.as_deref()),
        record.ui_lang.clone(),
        record.source.clone(),
    ]
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

fn number(value: Option<Decimal>) -> String {
    value.map(|d| d.normalize().to_string()).unwrap_or_default()
}

/// One line, at most [`NOTES_MAX_CHARS`] characters.
fn flatten_notes(notes: Option<&str>) -> String {
    notes
        .unwrap_or_default()
        .replace("\r\n", " ")
        .replace('\n', " ")
        .chars()
        .take(NOTES_MAX_CHARS)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn record() -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::nil(),
            submitted_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap(),
            name: "Ana \"Anita\" Ruiz".into(),
            email: "ana@example.org".into(),
            phone: None,
            city: "Lleida".into(),
            country: "España".into(),
            colegiado: "CAT-01234".into(),
            experience: Some(Decimal::new(50, 1)),
            website: Some("https://ana.example.org".into()),
            modality: "hybrid".into(),
            langs: vec!["es".into(), "ca".into()],
            approaches: vec!["Cognitivo-conductual".into()],
            specialties: Vec::new(),
            price_min: Some(Decimal::new(40, 0)),
            price_max: None,
            availability: Some(serde_json::json!({"from": "09:00", "mon": true})),
            notes: Some("Primera línea\nsegunda línea".into()),
            ui_lang: "es".into(),
            source: "landing-pro-mvp".into(),
        }
    }

    fn lines(csv: &str) -> Vec<String> {
        csv.lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_header_only_when_empty() {
        let out = lines(&to_csv(&[]));
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("\"submitted_at\",\"name\",\"email\""));
        assert!(out[0].ends_with("\"ui_lang\",\"source\""));
    }

    #[test]
    fn test_row_formatting() {
        let out = lines(&to_csv(&[record()]));
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[1],
            concat!(
                r#""2024-05-01T10:30:00.000Z","Ana ""Anita"" Ruiz","ana@example.org","","#,
                r#""Lleida","España","CAT-01234","5","https://ana.example.org","hybrid","#,
                r#""es|ca","Cognitivo-conductual","","40","","#,
                r#""{""from"":""09:00"",""mon"":true}","Primera línea segunda línea","#,
                r#""es","landing-pro-mvp""#,
            )
        );
    }

    #[test]
    fn test_notes_are_cut_by_characters() {
        let mut long = record();
        long.notes = Some("ñ".repeat(NOTES_MAX_CHARS + 20));
        assert_eq!(row(&long)[16].chars().count(), NOTES_MAX_CHARS);

        long.notes = Some("a\r\nb".into());
        assert_eq!(row(&long)[16], "a b");

        long.notes = None;
        assert_eq!(row(&long)[16], "");
    }

    #[test]
    fn test_no_trailing_newline() {
        let csv = to_csv(&[record(), record()]);
        assert_eq!(csv.matches('\n').count(), 2);
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(filename(date), "therapists_2024-03-07.csv");
    }
}
