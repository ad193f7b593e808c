//! Therapist profile as seen by its owner.

use serde::Serialize;

use psicofinders_core::{Availability, FeeRange, Languages, Modality, TherapistId};

/// The caller's own profile row.
#[derive(Debug, Clone, Serialize)]
pub struct TherapistProfile {
    pub id: TherapistId,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Professional registration number.
    pub colegiado: Option<String>,
    pub modality: Option<Modality>,
    pub langs: Vec<String>,
    pub approaches: Vec<String>,
    pub specialties: Vec<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub fees: FeeRange,
    pub availability: Availability,
    pub avatar_url: Option<String>,
    pub onboarding_complete: bool,
}

impl TherapistProfile {
    /// Name to greet the owner with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("profesional")
    }
}

/// Fields captured by the onboarding form.
#[derive(Debug, Clone)]
pub struct OnboardingSubmission {
    pub name: String,
    pub colegiado: String,
    pub modality: Modality,
    pub langs: Languages,
}

/// Editable identity fields on the profile page.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub colegiado: String,
    pub modality: Modality,
    pub langs: Languages,
    pub city: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> TherapistProfile {
        TherapistProfile {
            id: TherapistId::new(uuid::Uuid::nil()),
            email: Some("ana@example.org".into()),
            name: None,
            colegiado: None,
            modality: None,
            langs: Vec::new(),
            approaches: Vec::new(),
            specialties: Vec::new(),
            city: None,
            country: None,
            website: None,
            phone: None,
            fees: FeeRange::default(),
            availability: Availability::default(),
            avatar_url: None,
            onboarding_complete: false,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut profile = blank();
        assert_eq!(profile.display_name(), "ana@example.org");
        profile.name = Some("  ".into());
        assert_eq!(profile.display_name(), "ana@example.org");
        profile.name = Some("Ana Ruiz".into());
        assert_eq!(profile.display_name(), "Ana Ruiz");
        profile.name = None;
        profile.email = None;
        assert_eq!(profile.display_name(), "profesional");
    }
}
