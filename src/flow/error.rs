use leptos::prelude::ServerFnError;

/// Minimum password length accepted for a new patient account.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Failure reported by one of the remote collaborators, carrying its message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<ServerFnError> for ServiceError {
    fn from(err: ServerFnError) -> Self {
        match err {
            ServerFnError::ServerError(message) => Self(message),
            other => Self(other.to_string()),
        }
    }
}

/// Client-side checks that block a submission before any network call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("This email is not enrolled with the clinic")]
    EmailNotEnrolled,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Auth(String),
    #[error("patient status lookup failed: {0}")]
    Lookup(String),
    #[error("Access denied: this account is not enrolled as a patient")]
    EnrollmentDenied,
    #[error("Your session could not be saved on this device: {0}")]
    SessionNotSaved(String),
    #[error("marking the patient as registered failed: {0}")]
    SideEffect(String),
}

impl AccessError {
    /// Lookup and side-effect failures are logged, everything else is shown.
    pub fn is_surfaced(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Auth(_) | Self::EnrollmentDenied | Self::SessionNotSaved(_)
        )
    }
}

/// Checks the registration password rules.
pub fn validate_registration(password: &str, confirm_password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules() {
        assert_eq!(
            validate_registration("12345", "12345"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_registration("secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(validate_registration("secret1", "secret1"), Ok(()));
    }

    #[test]
    fn server_message_is_kept_verbatim() {
        let err = ServiceError::from(ServerFnError::new("Invalid login credentials"));
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn only_user_facing_errors_are_surfaced() {
        assert!(AccessError::Auth("nope".into()).is_surfaced());
        assert!(AccessError::EnrollmentDenied.is_surfaced());
        assert!(AccessError::SessionNotSaved("quota".into()).is_surfaced());
        assert!(!AccessError::Lookup("timeout".into()).is_surfaced());
        assert!(!AccessError::SideEffect("500".into()).is_surfaced());
    }
}
