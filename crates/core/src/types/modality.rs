//! Care modality offered by a therapist.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown modality: {0}")]
pub struct ModalityError(pub String);

/// How sessions are delivered. Stored as lowercase text (`inperson`, `online`, `hybrid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    #[default]
    #[serde(rename = "inperson")]
    InPerson,
    Online,
    Hybrid,
}

impl Modality {
    pub const ALL: [Self; 3] = [Self::InPerson, Self::Online, Self::Hybrid];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InPerson => "inperson",
            Self::Online => "online",
            Self::Hybrid => "hybrid",
        }
    }

    /// Spanish label shown on the pro pages and the public preview.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InPerson => "Presencial",
            Self::Online => "Online",
            Self::Hybrid => "Híbrida",
        }
    }

    /// Lenient parse used by application intake: anything unrecognised is in-person.
    #[must_use]
    pub fn parse_or_default(input: Option<&str>) -> Self {
        input.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = ModalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inperson" => Ok(Self::InPerson),
            "online" => Ok(Self::Online),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ModalityError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form_matches_storage() {
        for modality in Modality::ALL {
            assert_eq!(modality.as_str().parse::<Modality>().unwrap(), modality);
        }
        assert_eq!(
            serde_json::to_string(&Modality::InPerson).unwrap(),
            "\"inperson\""
        );
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!(
            "presencial".parse::<Modality>(),
            Err(ModalityError("presencial".to_owned()))
        );
    }

    #[test]
    fn test_lenient_parse_defaults_to_in_person() {
        assert_eq!(Modality::parse_or_default(Some("online")), Modality::Online);
        assert_eq!(Modality::parse_or_default(Some("Online")), Modality::InPerson);
        assert_eq!(Modality::parse_or_default(None), Modality::InPerson);
    }
}
