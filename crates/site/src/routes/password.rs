//! Password change for the signed-in account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequirePro;
use crate::state::AppState;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Template, WebTemplate)]
#[template(path = "pro/password.html")]
pub struct PasswordTemplate {
    pub current_path: &'static str,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl PasswordTemplate {
    const fn new(error: Option<String>, success: Option<String>) -> Self {
        Self {
            current_path: "/pro/password",
            error,
            success,
        }
    }
}

/// Not `Debug`, so the entries never reach the logs.
#[derive(Deserialize)]
pub struct PasswordForm {
    pub password: String,
    pub confirm: String,
}

/// Check the two entries.
///
/// # Errors
///
/// Returns the message to show when the password is too short or the
/// entries differ.
pub fn check_new_password(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Mínimo 8 caracteres.");
    }
    if password != confirm {
        return Err("Las contraseñas no coinciden.");
    }
    Ok(())
}

/// Display the password form.
///
/// GET /pro/password
pub async fn page(RequirePro(_caller): RequirePro) -> PasswordTemplate {
    PasswordTemplate::new(None, None)
}

/// Change the password at the identity provider.
///
/// POST /pro/password
#[instrument(skip_all)]
pub async fn submit(
    RequirePro(caller): RequirePro,
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Response {
    let password = form.password.as_str();
    if let Err(message) = check_new_password(password, &form.confirm) {
        return (
            StatusCode::BAD_REQUEST,
            PasswordTemplate::new(Some(message.to_owned()), None),
        )
            .into_response();
    }

    let Some(client) = state.identity() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            PasswordTemplate::new(Some("El servicio de acceso no está configurado.".to_owned()), None),
        )
            .into_response();
    };

    match client
        .update_password(&caller.session.access_token, password)
        .await
    {
        Ok(()) => {
            tracing::info!(therapist_id = %caller.identity.id, "Password changed");
            PasswordTemplate::new(None, Some("Contraseña actualizada.".to_owned())).into_response()
        }
        Err(e) if e.is_rejection() => {
            tracing::info!(error = %e, "Password change rejected");
            (
                StatusCode::BAD_REQUEST,
                PasswordTemplate::new(Some(rejection_message(&e)), None),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Password change failed");
            (
                StatusCode::BAD_GATEWAY,
                PasswordTemplate::new(
                    Some("No se pudo cambiar la contraseña. Inténtalo de nuevo.".to_owned()),
                    None,
                ),
            )
                .into_response()
        }
    }
}

/// The provider's own explanation, e.g. a password strength rule.
fn rejection_message(error: &crate::services::IdentityError) -> String {
    match error {
        crate::services::IdentityError::Api { message, .. } if !message.is_empty() => {
            message.clone()
        }
        _ => "La contraseña no es válida.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        assert_eq!(check_new_password("1234567", "1234567"), Err("Mínimo 8 caracteres."));
    }

    #[test]
    fn test_mismatch_rejected() {
        assert_eq!(
            check_new_password("correct-horse", "correct-house"),
            Err("Las contraseñas no coinciden.")
        );
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(check_new_password("ññññññññ", "ññññññññ").is_ok());
    }
}
