//! Spoken languages of a therapist.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguagesError {
    #[error("select at least one language")]
    Empty,
}

/// Non-empty set of language codes, kept in the order they were chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Languages(Vec<String>);

impl Languages {
    /// Codes offered on the onboarding form.
    pub const ONBOARDING_OPTIONS: [&'static str; 4] = ["es", "ca", "en", "fr"];
    /// Codes offered on the profile form.
    pub const PROFILE_OPTIONS: [&'static str; 6] = ["es", "ca", "en", "fr", "pt", "de"];

    /// Build a language set from raw codes, dropping blanks and duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`LanguagesError::Empty`] if nothing is left.
    pub fn new<I, S>(codes: I) -> Result<Self, LanguagesError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim();
            if !code.is_empty() && !out.iter().any(|c| c == code) {
                out.push(code.to_owned());
            }
        }
        if out.is_empty() {
            return Err(LanguagesError::Empty);
        }
        Ok(Self(out))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl TryFrom<Vec<String>> for Languages {
    type Error = LanguagesError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Languages> for Vec<String> {
    fn from(langs: Languages) -> Self {
        langs.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let langs = Languages::new(["ca", "es", "ca", " en "]).unwrap();
        assert_eq!(langs.as_slice(), ["ca", "es", "en"]);
        assert!(langs.contains("en"));
    }

    #[test]
    fn test_empty_after_cleanup_is_rejected() {
        assert_eq!(Languages::new(["", "  "]), Err(LanguagesError::Empty));
        assert_eq!(
            Languages::new(Vec::<String>::new()),
            Err(LanguagesError::Empty)
        );
    }
}
