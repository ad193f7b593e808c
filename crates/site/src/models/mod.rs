//! Domain models for the site.

pub mod application;
pub mod session;
pub mod therapist;

pub use application::NewApplication;
pub use session::{Identity, ProCaller, ProviderSession};
pub use therapist::{OnboardingSubmission, ProfileUpdate, TherapistProfile};
