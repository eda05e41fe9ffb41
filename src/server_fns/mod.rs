mod auth;
mod patients;

pub use auth::*;
pub use patients::*;

/// Server-side plumbing shared by the server functions.
#[cfg(feature = "ssr")]
pub(crate) mod context {
    use axum::Extension;
    use leptos::prelude::ServerFnError;
    use leptos_axum::extract;
    use tower_sessions::Session;
    use tracing::error;

    use crate::models::SessionUser;
    use crate::services::auth::AuthError;
    use crate::state::AppState;

    pub const SESSION_USER_KEY: &str = "user";

    pub async fn app_state() -> Result<AppState, ServerFnError> {
        let Extension(state) = extract::<Extension<AppState>>()
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        Ok(state)
    }

    pub async fn session() -> Result<Session, ServerFnError> {
        let Extension(session) = extract::<Extension<Session>>()
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        Ok(session)
    }

    pub async fn principal(session: &Session) -> Result<Option<SessionUser>, ServerFnError> {
        session
            .get::<SessionUser>(SESSION_USER_KEY)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))
    }

    pub async fn require_principal(session: &Session) -> Result<SessionUser, ServerFnError> {
        principal(session)
            .await?
            .ok_or_else(|| ServerFnError::new("Not signed in"))
    }

    /// Starts a fresh server session for `user`.
    pub async fn establish(session: &Session, user: &SessionUser) -> Result<(), ServerFnError> {
        session
            .cycle_id()
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        session
            .insert(SESSION_USER_KEY, user)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))
    }

    /// Auth failures keep their message; storage failures are logged and
    /// replaced by a generic one.
    pub fn auth_error(err: AuthError) -> ServerFnError {
        match err {
            AuthError::Db(_) | AuthError::Other(_) => internal_error(err),
            err => ServerFnError::new(err.to_string()),
        }
    }

    pub fn internal_error(err: impl std::fmt::Display) -> ServerFnError {
        error!("server function failed: {err}");
        ServerFnError::new("Something went wrong, please try again")
    }
}
