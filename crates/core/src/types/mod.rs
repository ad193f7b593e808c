//! Core types for Psicofinders.
//!
//! This module provides type-safe wrappers for the marketplace domain.

pub mod availability;
pub mod credential;
pub mod email;
pub mod fees;
pub mod id;
pub mod languages;
pub mod modality;
pub mod onboarding;

pub use availability::{Availability, AvailabilityError, DayKey, MAX_SLOTS_PER_DAY, TimeSlot};
pub use credential::{AdminCredentialVerifier, AdminDigest, AdminSessionToken, Rejected};
pub use email::{Email, EmailError};
pub use fees::{FeeRange, FeeRangeError};
pub use id::*;
pub use languages::{Languages, LanguagesError};
pub use modality::{Modality, ModalityError};
pub use onboarding::OnboardingState;
