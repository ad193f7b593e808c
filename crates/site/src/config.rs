//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_SESSION_SECRET` - Cookie encryption secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SITE_DATABASE_URL` / `DATABASE_URL` - `PostgreSQL` connection string. Without it
//!   intake and the pro pages answer 500 and the onboarding check fails open.
//! - `SITE_URL` - Public origin, used to build the invitation callback URL
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SUPABASE_URL` + `SUPABASE_ANON_KEY` - Identity provider. Without them nobody
//!   can sign in and every protected `/pro` page redirects to the login page.
//! - `SUPABASE_SERVICE_ROLE_KEY` - Enables invitations after intake
//! - `AUTO_INVITE_PROS` - Set to `false` to skip invitations (default: enabled)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site configuration, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: Option<SecretString>,
    pub host: IpAddr,
    pub port: u16,
    /// Public origin without trailing slash, e.g. `https://psicofinders.com`
    pub site_url: Option<String>,
    /// Secret the cookie encryption key is derived from
    pub session_secret: SecretString,
    pub identity: Option<IdentityConfig>,
    /// Invite applicants to create their account after intake
    pub auto_invite: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Identity provider (Supabase Auth) settings.
///
/// Implements `Debug` manually to redact keys.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: String,
    /// Public key sent as `apikey` on user-facing calls
    pub anon_key: SecretString,
    /// Admin key for invitations; absent disables them
    pub service_role_key: Option<SecretString>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field(
                "service_role_key",
                &self.service_role_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL");
        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let site_url = get_optional_env("SITE_URL").map(|url| normalize_origin(&url));
        let session_secret = get_validated_secret("SITE_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SITE_SESSION_SECRET")?;

        let identity = IdentityConfig::from_env();
        let auto_invite = get_optional_env("AUTO_INVITE_PROS").as_deref() != Some("false");

        Ok(Self {
            database_url,
            host,
            port,
            site_url,
            session_secret,
            identity,
            auto_invite,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Where the identity provider sends invited users back to.
    #[must_use]
    pub fn callback_url(&self) -> Option<String> {
        self.site_url
            .as_ref()
            .map(|origin| format!("{origin}/auth/callback"))
    }

    /// Cookies get the `Secure` flag unless the site is served over plain http.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        !self
            .site_url
            .as_deref()
            .is_some_and(|url| url.starts_with("http://"))
    }
}

impl IdentityConfig {
    /// Both the URL and the public key must be set; either alone is ignored.
    fn from_env() -> Option<Self> {
        let url = get_optional_env("SUPABASE_URL")?;
        let anon_key = get_optional_env("SUPABASE_ANON_KEY")?;
        Some(Self {
            url: normalize_origin(&url),
            anon_key: SecretString::from(anon_key),
            service_role_key: get_optional_env("SUPABASE_SERVICE_ROLE_KEY").map(SecretString::from),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn normalize_origin(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional environment variable; blank counts as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    match raw.parse::<f32>() {
        Ok(rate) if (0.0..=1.0).contains(&rate) => Ok(rate),
        _ => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a number between 0 and 1, got {raw}"),
        )),
    }
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Configuration for router tests: no database, no identity provider.
    pub(crate) fn test_config() -> SiteConfig {
        SiteConfig {
            database_url: None,
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            site_url: Some("https://psicofinders.test".to_string()),
            session_secret: SecretString::from("Zq8#vL2m!Rt6@pW9xK4$nB7&cY1^hJ3*"),
            identity: None,
            auto_invite: true,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_uniform() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("abab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let err = validate_secret_strength("changeme-changeme-changeme-12345", "SITE_SESSION_SECRET")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        assert!(validate_secret_strength(&"ab".repeat(20), "SITE_SESSION_SECRET").is_err());
    }

    #[test]
    fn test_random_secret_accepted() {
        let config = test_config();
        let secret = config.session_secret.expose_secret();
        assert!(validate_secret_strength(secret, "SITE_SESSION_SECRET").is_ok());
        assert!(validate_session_secret(&config.session_secret, "SITE_SESSION_SECRET").is_ok());
    }

    #[test]
    fn test_short_session_secret_rejected() {
        let short = SecretString::from("Zq8#vL2m!Rt6");
        assert!(validate_session_secret(&short, "SITE_SESSION_SECRET").is_err());
    }

    #[test]
    fn test_callback_url_and_cookie_security() {
        let mut config = test_config();
        assert_eq!(
            config.callback_url().as_deref(),
            Some("https://psicofinders.test/auth/callback")
        );
        assert!(config.secure_cookies());

        config.site_url = Some(normalize_origin("http://localhost:3000/ "));
        assert_eq!(
            config.callback_url().as_deref(),
            Some("http://localhost:3000/auth/callback")
        );
        assert!(!config.secure_cookies());

        config.site_url = None;
        assert_eq!(config.callback_url(), None);
    }

    #[test]
    fn test_identity_config_debug_redacts_keys() {
        let identity = IdentityConfig {
            url: "https://abcd.supabase.co".to_string(),
            anon_key: SecretString::from("anon-key-value"),
            service_role_key: Some(SecretString::from("service-role-value")),
        };
        let rendered = format!("{identity:?}");
        assert!(rendered.contains("abcd.supabase.co"));
        assert!(!rendered.contains("anon-key-value"));
        assert!(!rendered.contains("service-role-value"));
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
