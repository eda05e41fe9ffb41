use leptos::prelude::*;

use crate::models::{SessionUser, SignUpResponse};

#[server]
pub async fn get_current_user() -> Result<Option<SessionUser>, ServerFnError> {
    use crate::server_fns::context::{principal, session};

    let session = session().await?;
    principal(&session).await
}

#[server]
pub async fn sign_up(
    email: String,
    password: String,
    redirect_to: String,
) -> Result<SignUpResponse, ServerFnError> {
    use crate::models::AuthSession;
    use crate::server_fns::context::{app_state, auth_error, establish, internal_error, session};
    use crate::services::auth;

    let state = app_state().await?;
    let confirmed = !state.auth.require_email_confirmation;

    let account = auth::sign_up(&state.db, &email, &password, confirmed)
        .await
        .map_err(auth_error)?;
    let user = SessionUser {
        id: account.id,
        email: account.email,
    };

    if !confirmed {
        let token = auth::create_confirmation_token(&state.db, &user.id)
            .await
            .map_err(auth_error)?;
        let link = state.auth.confirmation_link(&redirect_to, &token);
        state
            .email
            .send_confirmation(&user.email, &link)
            .await
            .map_err(internal_error)?;
        return Ok(SignUpResponse {
            user: Some(user),
            session: None,
        });
    }

    let session = session().await?;
    establish(&session, &user).await?;
    Ok(SignUpResponse {
        user: Some(user.clone()),
        session: Some(AuthSession {
            user,
            issued_at: chrono::Utc::now(),
        }),
    })
}

#[server]
pub async fn sign_in_with_password(
    email: String,
    password: String,
) -> Result<SessionUser, ServerFnError> {
    use crate::server_fns::context::{app_state, auth_error, establish, session};
    use crate::services::auth;

    let state = app_state().await?;
    let session = session().await?;

    let account = auth::sign_in(&state.db, &email, &password)
        .await
        .map_err(auth_error)?;
    let user = SessionUser {
        id: account.id,
        email: account.email,
    };
    establish(&session, &user).await?;
    Ok(user)
}

#[server]
pub async fn sign_out() -> Result<(), ServerFnError> {
    use crate::server_fns::context::session;

    let session = session().await?;
    session
        .delete()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[server]
pub async fn confirm_email(token: String) -> Result<(), ServerFnError> {
    use crate::server_fns::context::{app_state, auth_error};
    use crate::services::{auth, patients};

    let state = app_state().await?;
    let (account_id, email) = auth::confirm_email(&state.db, &token)
        .await
        .map_err(auth_error)?;

    if let Err(err) = patients::mark_registered_by_email(&state.db, &account_id, &email).await {
        tracing::warn!(%account_id, "could not mark patient registered on confirmation: {err}");
    }
    Ok(())
}
