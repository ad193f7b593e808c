//! Onboarding state of a pro account.

use serde::Serialize;

/// Where an authenticated account stands in onboarding.
///
/// ```text
/// NoAccount --(first profile upsert)--> Incomplete --(upsert with flag set)--> Complete
/// ```
///
/// `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingState {
    /// No profile row exists for the identity yet.
    NoAccount,
    /// A profile row exists with `onboarding_complete = false`.
    Incomplete,
    Complete,
}

impl OnboardingState {
    /// Classify from the stored completeness flag; `None` means no row.
    #[must_use]
    pub const fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::NoAccount,
            Some(false) => Self::Incomplete,
            Some(true) => Self::Complete,
        }
    }

    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Landing page right after a successful sign-in.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        if self.is_complete() {
            crate::gate::DASHBOARD_PATH
        } else {
            crate::gate::ONBOARDING_PATH
        }
    }
}
