//! Shared form helpers: option lists for checkboxes and radios, and input
//! clean-up.

use psicofinders_core::Modality;

/// A language checkbox.
#[derive(Debug, Clone)]
pub struct LangOption {
    pub code: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

/// A modality radio button.
#[derive(Debug, Clone)]
pub struct ModalityOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Display name of a language code; unknown codes map to themselves.
#[must_use]
pub fn language_label(code: &str) -> Option<&'static str> {
    match code {
        "es" => Some("Español"),
        "ca" => Some("Català"),
        "en" => Some("English"),
        "fr" => Some("Français"),
        "pt" => Some("Português"),
        "de" => Some("Deutsch"),
        _ => None,
    }
}

#[must_use]
pub fn lang_options(codes: &[&'static str], selected: &[String]) -> Vec<LangOption> {
    codes
        .iter()
        .map(|&code| LangOption {
            code,
            label: language_label(code).unwrap_or(code),
            checked: selected.iter().any(|s| s == code),
        })
        .collect()
}

#[must_use]
pub fn modality_options(selected: Option<Modality>) -> Vec<ModalityOption> {
    Modality::ALL
        .into_iter()
        .map(|m| ModalityOption {
            value: m.as_str(),
            label: m.label(),
            selected: selected == Some(m),
        })
        .collect()
}

/// Trimmed input, `None` when blank.
#[must_use]
pub fn optional(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Trimmed required input.
///
/// # Errors
///
/// Returns the message to show when the input is blank.
pub fn required(input: &str, message: &str) -> Result<String, String> {
    optional(Some(input)).ok_or_else(|| message.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_options_marks_selected() {
        let options = lang_options(&["es", "ca", "en"], &["ca".to_owned()]);
        assert_eq!(options.len(), 3);
        assert!(!options[0].checked);
        assert!(options[1].checked);
        assert_eq!(options[1].label, "Català");
    }

    #[test]
    fn test_modality_options() {
        let options = modality_options(Some(Modality::Hybrid));
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.value == "hybrid" && o.selected));
        assert!(modality_options(None).iter().all(|o| !o.selected));
    }

    #[test]
    fn test_optional_and_required() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" Lleida ")), Some("Lleida".to_owned()));
        assert_eq!(optional(None), None);
        assert_eq!(required(" ", "Falta el nombre."), Err("Falta el nombre.".to_owned()));
    }
}
