use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::channel::mpsc::{unbounded, UnboundedSender};

use super::{AuthEvents, AuthService, PatientDirectory, ServiceError};
use crate::models::{
    AuthSession, AuthStateEvent, PatientRecord, PatientStatusRow, SessionUser, SignUpResponse,
};
use crate::server_fns;

/// Auth service reached through server functions.
///
/// Server functions only answer the call that was made, so session
/// transitions are broadcast from here to every subscriber.
#[derive(Clone, Default)]
pub struct ServerAuthClient {
    listeners: Arc<Mutex<Vec<UnboundedSender<AuthStateEvent>>>>,
}

impl ServerAuthClient {
    fn emit(&self, event: AuthStateEvent) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
        }
    }
}

impl AuthService for ServerAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpResponse, ServiceError> {
        let response = server_fns::sign_up(
            email.to_string(),
            password.to_string(),
            redirect_to.to_string(),
        )
        .await?;
        if let Some(session) = &response.session {
            self.emit(AuthStateEvent::SignedIn(session.clone()));
        }
        Ok(response)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ServiceError> {
        let user = server_fns::sign_in_with_password(email.to_string(), password.to_string()).await?;
        self.emit(AuthStateEvent::SignedIn(AuthSession {
            user: user.clone(),
            issued_at: Utc::now(),
        }));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        server_fns::sign_out().await?;
        self.emit(AuthStateEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthEvents {
        let (tx, rx) = unbounded();
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(tx);
        }
        rx
    }
}

/// Patient procedures reached through server functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerPatientDirectory;

impl PatientDirectory for ServerPatientDirectory {
    async fn lookup_status(&self, email: &str) -> Result<Vec<PatientStatusRow>, ServiceError> {
        Ok(server_fns::check_patient_email(email.to_string()).await?)
    }

    async fn mark_registered(&self) -> Result<(), ServiceError> {
        Ok(server_fns::mark_patient_registered().await?)
    }

    async fn find_patient(&self, email: &str) -> Result<Option<PatientRecord>, ServiceError> {
        Ok(server_fns::get_patient_by_email(email.to_string()).await?)
    }
}
