//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use crate::routes::forms::language_label;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Display name of a language code, the code itself when unknown.
///
/// Usage in templates: `{{ code|lang_label }}`
#[askama::filter_fn]
pub fn lang_label(code: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let code = code.to_string();
    Ok(language_label(&code).map_or(code, str::to_owned))
}
