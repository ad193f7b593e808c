//! Access gate decisions for the `/pro` area and the `/admin` backoffice.
//!
//! Both gates are plain functions from request facts to a [`Decision`]; the
//! binaries translate their HTTP requests into these calls and turn
//! [`Decision::Redirect`] into a `302`.
//!
//! # `/pro` rules
//!
//! 1. Classify the path as [`ProRoute::Login`], [`ProRoute::Onboarding`] or
//!    [`ProRoute::Protected`].
//! 2. Anonymous caller on a protected path: redirect to the login page with
//!    `next=<path?query>` (omitted when it would point at the login page).
//! 3. Authenticated caller on the login page: redirect to the dashboard.
//! 4. Authenticated caller anywhere but onboarding: look up the onboarding
//!    state and redirect to onboarding unless it is complete. A failed lookup
//!    lets the request through.
//! 5. Otherwise allow.
//!
//! # `/admin` rules
//!
//! The login page and its authorize endpoint are always reachable. Every
//! other `/admin` path needs a session marker accepted by the
//! [`AdminCredentialVerifier`], else it redirects to the login page with
//! `?err=1`.

use std::future::Future;

use crate::types::{AdminCredentialVerifier, OnboardingState};

pub const PRO_PREFIX: &str = "/pro";
pub const LOGIN_PATH: &str = "/pro/login";
pub const ONBOARDING_PATH: &str = "/pro/onboarding";
pub const DASHBOARD_PATH: &str = "/pro/dashboard";

pub const ADMIN_PREFIX: &str = "/admin";
pub const ADMIN_HOME_PATH: &str = "/admin";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_AUTHORIZE_PATH: &str = "/admin/login/authorize";
pub const ADMIN_LOGIN_ERROR_PATH: &str = "/admin/login?err=1";

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Send the caller elsewhere. The target is a site-relative path.
    Redirect(String),
}

impl Decision {
    fn redirect(target: impl Into<String>) -> Self {
        Self::Redirect(target.into())
    }
}

/// Kind of page under `/pro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProRoute {
    /// Exactly `/pro/login`.
    Login,
    /// `/pro/onboarding` and anything starting with it.
    Onboarding,
    /// Any other `/pro` path.
    Protected,
}

impl ProRoute {
    /// Classify a request path; `None` when it is outside `/pro`.
    #[must_use]
    pub fn classify(path: &str) -> Option<Self> {
        if !within(path, PRO_PREFIX) {
            return None;
        }
        if path == LOGIN_PATH {
            Some(Self::Login)
        } else if path.starts_with(ONBOARDING_PATH) {
            Some(Self::Onboarding)
        } else {
            Some(Self::Protected)
        }
    }
}

fn within(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Result of [`guard`], carrying the onboarding lookup error when the gate
/// failed open so the caller can log it.
#[derive(Debug)]
pub struct GateOutcome<E> {
    pub decision: Decision,
    pub lookup_error: Option<E>,
}

impl<E> GateOutcome<E> {
    const fn decided(decision: Decision) -> Self {
        Self {
            decision,
            lookup_error: None,
        }
    }
}

/// Decide whether a `/pro` request may proceed.
///
/// `identity` is the resolved caller (`None` when anonymous or when
/// resolution failed). `onboarding` is only invoked at step 4, so anonymous
/// requests and the onboarding pages never touch the store.
pub async fn guard<I, F, Fut, E>(
    path: &str,
    query: Option<&str>,
    identity: Option<&I>,
    onboarding: F,
) -> GateOutcome<E>
where
    I: ?Sized,
    F: FnOnce(&I) -> Fut,
    Fut: Future<Output = Result<OnboardingState, E>>,
{
    let Some(route) = ProRoute::classify(path) else {
        return GateOutcome::decided(Decision::Allow);
    };

    let Some(identity) = identity else {
        return GateOutcome::decided(match route {
            ProRoute::Protected => Decision::Redirect(login_redirect(path, query)),
            ProRoute::Login | ProRoute::Onboarding => Decision::Allow,
        });
    };

    match route {
        ProRoute::Login => GateOutcome::decided(Decision::redirect(DASHBOARD_PATH)),
        ProRoute::Onboarding => GateOutcome::decided(Decision::Allow),
        ProRoute::Protected => match onboarding(identity).await {
            Ok(state) if state.is_complete() => GateOutcome::decided(Decision::Allow),
            Ok(_) => GateOutcome::decided(Decision::redirect(ONBOARDING_PATH)),
            Err(err) => GateOutcome {
                decision: Decision::Allow,
                lookup_error: Some(err),
            },
        },
    }
}

/// Login URL that returns the caller to `path?query` afterwards.
#[must_use]
pub fn login_redirect(path: &str, query: Option<&str>) -> String {
    let next = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{path}?{q}"),
        None => path.to_owned(),
    };
    if next == LOGIN_PATH {
        return LOGIN_PATH.to_owned();
    }
    format!("{LOGIN_PATH}?next={}", encode_query_value(&next))
}

fn encode_query_value(value: &str) -> String {
    // `/` is legal inside a query component and keeps the URL readable.
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
}

/// Post-login destination. Only same-site `/pro/` paths are honoured.
#[must_use]
pub fn safe_next(next: Option<&str>) -> String {
    next.map(str::trim)
        .filter(|n| n.starts_with("/pro/") && !n.contains('\\') && !n.starts_with(LOGIN_PATH))
        .map_or_else(|| DASHBOARD_PATH.to_owned(), str::to_owned)
}

/// Decide whether an `/admin` request may proceed.
#[must_use]
pub fn admin_guard(
    path: &str,
    session_marker: Option<&str>,
    verifier: &AdminCredentialVerifier,
) -> Decision {
    if !within(path, ADMIN_PREFIX) || path == ADMIN_LOGIN_PATH || path == ADMIN_AUTHORIZE_PATH {
        return Decision::Allow;
    }
    if session_marker.is_some_and(|marker| verifier.accepts_session(marker)) {
        Decision::Allow
    } else {
        Decision::redirect(ADMIN_LOGIN_ERROR_PATH)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::types::AdminDigest;

    #[derive(Debug)]
    struct User;

    const PROTECTED: [&str; 7] = [
        "/pro",
        "/pro/dashboard",
        "/pro/perfil",
        "/pro/honorarios",
        "/pro/agenda",
        "/pro/password",
        "/pro/login/extra",
    ];

    async fn run(path: &str, query: Option<&str>, user: Option<&User>, state: OnboardingState) -> Decision {
        guard(path, query, user, |_| async move { Ok::<_, ()>(state) })
            .await
            .decision
    }

    #[test]
    fn test_classify() {
        assert_eq!(ProRoute::classify("/pro/login"), Some(ProRoute::Login));
        assert_eq!(ProRoute::classify("/pro/onboarding"), Some(ProRoute::Onboarding));
        assert_eq!(ProRoute::classify("/pro/onboarding/step-2"), Some(ProRoute::Onboarding));
        assert_eq!(ProRoute::classify("/pro/login/"), Some(ProRoute::Protected));
        assert_eq!(ProRoute::classify("/pro"), Some(ProRoute::Protected));
        assert_eq!(ProRoute::classify("/pros"), None);
        assert_eq!(ProRoute::classify("/profile"), None);
        assert_eq!(ProRoute::classify("/"), None);
    }

    #[tokio::test]
    async fn test_anonymous_protected_goes_to_login_with_next() {
        assert_eq!(
            run("/pro/perfil", None, None, OnboardingState::Complete).await,
            Decision::Redirect("/pro/login?next=/pro/perfil".to_owned())
        );
    }

    #[tokio::test]
    async fn test_next_keeps_query() {
        assert_eq!(
            run("/pro/agenda", Some("day=mon&x=1"), None, OnboardingState::Complete).await,
            Decision::Redirect("/pro/login?next=/pro/agenda%3Fday%3Dmon%26x%3D1".to_owned())
        );
        assert_eq!(login_redirect("/pro/login", None), "/pro/login");
        assert_eq!(login_redirect("/pro/login", Some("")), "/pro/login");
    }

    #[tokio::test]
    async fn test_anonymous_never_reaches_protected() {
        for path in PROTECTED {
            let decision = run(path, None, None, OnboardingState::Complete).await;
            let Decision::Redirect(target) = decision else {
                panic!("{path} allowed without identity");
            };
            assert!(target.starts_with(LOGIN_PATH));
            assert_ne!(target, path);
        }
    }

    #[tokio::test]
    async fn test_anonymous_login_and_onboarding_allowed() {
        for path in ["/pro/login", "/pro/onboarding"] {
            assert_eq!(run(path, None, None, OnboardingState::NoAccount).await, Decision::Allow);
        }
    }

    #[tokio::test]
    async fn test_incomplete_dashboard_goes_to_onboarding() {
        for state in [OnboardingState::Incomplete, OnboardingState::NoAccount] {
            assert_eq!(
                run("/pro/dashboard", None, Some(&User), state).await,
                Decision::Redirect(ONBOARDING_PATH.to_owned())
            );
        }
    }

    #[tokio::test]
    async fn test_incomplete_never_loops() {
        for state in [OnboardingState::Incomplete, OnboardingState::NoAccount] {
            for path in PROTECTED.iter().copied().chain(["/pro/onboarding", "/pro/login"]) {
                if let Decision::Redirect(target) = run(path, None, Some(&User), state).await {
                    assert_ne!(target, path);
                }
            }
            assert_eq!(
                run("/pro/onboarding", None, Some(&User), state).await,
                Decision::Allow
            );
        }
    }

    #[tokio::test]
    async fn test_authenticated_login_goes_to_dashboard() {
        for state in [OnboardingState::Complete, OnboardingState::Incomplete] {
            assert_eq!(
                run("/pro/login", None, Some(&User), state).await,
                Decision::Redirect(DASHBOARD_PATH.to_owned())
            );
        }
    }

    #[tokio::test]
    async fn test_complete_allowed_everywhere_but_login() {
        for path in PROTECTED.iter().copied().chain(["/pro/onboarding"]) {
            assert_eq!(
                run(path, None, Some(&User), OnboardingState::Complete).await,
                Decision::Allow
            );
        }
    }

    #[tokio::test]
    async fn test_lookup_error_fails_open() {
        let outcome = guard("/pro/perfil", None, Some(&User), |_| async {
            Err::<OnboardingState, _>("store unreachable")
        })
        .await;
        assert_eq!(outcome.decision, Decision::Allow);
        assert_eq!(outcome.lookup_error, Some("store unreachable"));
    }

    #[tokio::test]
    async fn test_lookup_skipped_when_not_needed() {
        let calls = Cell::new(0);
        for (path, user) in [
            ("/pro/perfil", None),
            ("/pro/login", Some(&User)),
            ("/pro/onboarding", Some(&User)),
            ("/pros", Some(&User)),
        ] {
            let _ = guard(path, None, user, |_| {
                calls.set(calls.get() + 1);
                async { Ok::<_, ()>(OnboardingState::Complete) }
            })
            .await;
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/pro/perfil")), "/pro/perfil");
        assert_eq!(safe_next(Some("/pro/agenda?day=mon")), "/pro/agenda?day=mon");
        for bad in ["https://evil.test/pro/", "//evil.test", "/admin", "/pro/login", "/pro\\x"] {
            assert_eq!(safe_next(Some(bad)), DASHBOARD_PATH, "{bad}");
        }
        assert_eq!(safe_next(None), DASHBOARD_PATH);
    }

    fn verifier() -> AdminCredentialVerifier {
        AdminCredentialVerifier::new(Some(AdminDigest::of("s3cret")))
    }

    #[test]
    fn test_admin_login_endpoints_always_reachable() {
        let unconfigured = AdminCredentialVerifier::new(None);
        for path in [ADMIN_LOGIN_PATH, ADMIN_AUTHORIZE_PATH] {
            assert_eq!(admin_guard(path, None, &verifier()), Decision::Allow);
            assert_eq!(admin_guard(path, None, &unconfigured), Decision::Allow);
        }
    }

    #[test]
    fn test_admin_requires_marker() {
        let marker = AdminDigest::of("s3cret");
        for path in ["/admin", "/admin/export", "/admin/logout"] {
            assert_eq!(
                admin_guard(path, None, &verifier()),
                Decision::Redirect(ADMIN_LOGIN_ERROR_PATH.to_owned())
            );
            assert_eq!(
                admin_guard(path, Some("forged"), &verifier()),
                Decision::Redirect(ADMIN_LOGIN_ERROR_PATH.to_owned())
            );
            assert_eq!(
                admin_guard(path, Some(marker.as_str()), &verifier()),
                Decision::Allow
            );
        }
    }

    #[test]
    fn test_admin_unconfigured_fails_closed() {
        let marker = AdminDigest::of("s3cret");
        assert_eq!(
            admin_guard("/admin", Some(marker.as_str()), &AdminCredentialVerifier::new(None)),
            Decision::Redirect(ADMIN_LOGIN_ERROR_PATH.to_owned())
        );
    }

    #[test]
    fn test_admin_guard_ignores_other_paths() {
        assert_eq!(admin_guard("/health", None, &verifier()), Decision::Allow);
        assert_eq!(admin_guard("/administrator", None, &verifier()), Decision::Allow);
    }
}
