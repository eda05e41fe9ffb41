use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::Utc;
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use super::{
    validate_registration, AccessError, AuthService, LocalSession, PatientDirectory,
    SessionStorage, Submission, ValidationError,
};
use crate::models::{AuthStateEvent, FormMode};

/// Where an admitted patient is sent.
pub const PATIENT_LANDING: &str = "/patient";

/// One-shot guard around the mark-registered call.
#[derive(Clone, Debug, Default)]
pub struct RegistrationLatch(Arc<AtomicBool>);

impl RegistrationLatch {
    /// True for exactly one caller over the latch's lifetime.
    pub fn try_claim(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The account is active and the patient was signed in straight away.
    Registered,
    /// The auth service sent a confirmation link first.
    ConfirmationPending,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Admission {
    pub session: LocalSession,
    pub destination: &'static str,
}

/// User-facing message produced by a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    RegistrationSucceeded,
    ConfirmationPending,
    RegistrationFailed(String),
    LoginSucceeded { name: String },
    AccessDenied,
    LoginFailed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::RegistrationSucceeded => "Registration complete. You can now sign in.".into(),
            Self::ConfirmationPending => {
                "Check your email to confirm your account, then sign in.".into()
            }
            Self::RegistrationFailed(message) | Self::LoginFailed(message) => message.clone(),
            Self::LoginSucceeded { name } => format!("Welcome back, {name}!"),
            Self::AccessDenied => AccessError::EnrollmentDenied.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::RegistrationFailed(_) | Self::LoginFailed(_) | Self::AccessDenied
        )
    }
}

/// Everything the page needs to react to a finished submission.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitReport {
    pub notice: Notice,
    /// The form goes back to login with cleared passwords.
    pub registration_completed: bool,
    pub admission: Option<Admission>,
}

/// Runs registration and login against the auth service and the patient store.
pub struct SessionEstablisher<A, D, S> {
    auth: Arc<A>,
    directory: Arc<D>,
    storage: Arc<S>,
    latch: RegistrationLatch,
    confirm_redirect: String,
}

impl<A, D, S> Clone for SessionEstablisher<A, D, S> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            directory: Arc::clone(&self.directory),
            storage: Arc::clone(&self.storage),
            latch: self.latch.clone(),
            confirm_redirect: self.confirm_redirect.clone(),
        }
    }
}

impl<A, D, S> SessionEstablisher<A, D, S>
where
    A: AuthService,
    D: PatientDirectory,
    S: SessionStorage,
{
    pub fn new(
        auth: Arc<A>,
        directory: Arc<D>,
        storage: Arc<S>,
        confirm_redirect: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            directory,
            storage,
            latch: RegistrationLatch::default(),
            confirm_redirect: confirm_redirect.into(),
        }
    }

    pub fn latch(&self) -> &RegistrationLatch {
        &self.latch
    }

    /// Submits the form in its current mode. Never fails: every error ends up
    /// as a notice.
    pub async fn submit(&self, submission: Submission) -> SubmitReport {
        match submission.mode {
            FormMode::Registration => {
                let result = self
                    .submit_registration(
                        &submission.email,
                        &submission.password,
                        &submission.confirm_password,
                        submission.email_exists,
                    )
                    .await;
                match result {
                    Ok(outcome) => SubmitReport {
                        notice: match outcome {
                            RegistrationOutcome::Registered => Notice::RegistrationSucceeded,
                            RegistrationOutcome::ConfirmationPending => Notice::ConfirmationPending,
                        },
                        registration_completed: true,
                        admission: None,
                    },
                    Err(err) => SubmitReport {
                        notice: Notice::RegistrationFailed(err.to_string()),
                        registration_completed: false,
                        admission: None,
                    },
                }
            }
            FormMode::Login => {
                match self
                    .submit_login(&submission.email, &submission.password)
                    .await
                {
                    Ok(admission) => SubmitReport {
                        notice: Notice::LoginSucceeded {
                            name: admission.session.name.clone(),
                        },
                        registration_completed: false,
                        admission: Some(admission),
                    },
                    Err(AccessError::EnrollmentDenied) => SubmitReport {
                        notice: Notice::AccessDenied,
                        registration_completed: false,
                        admission: None,
                    },
                    Err(err) => SubmitReport {
                        notice: Notice::LoginFailed(err.to_string()),
                        registration_completed: false,
                        admission: None,
                    },
                }
            }
        }
    }

    pub async fn submit_registration(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
        email_exists: bool,
    ) -> Result<RegistrationOutcome, AccessError> {
        validate_registration(password, confirm_password)?;
        if !email_exists {
            return Err(ValidationError::EmailNotEnrolled.into());
        }

        let response = self
            .auth
            .sign_up(email, password, &self.confirm_redirect)
            .await
            .map_err(|e| AccessError::Auth(e.to_string()))?;

        if response.session.is_none() {
            info!("patient sign-up awaiting email confirmation");
            return Ok(RegistrationOutcome::ConfirmationPending);
        }

        self.mark_registered_once("sign-up").await;
        Ok(RegistrationOutcome::Registered)
    }

    pub async fn submit_login(&self, email: &str, password: &str) -> Result<Admission, AccessError> {
        let user = self
            .auth
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| AccessError::Auth(e.to_string()))?;

        let record = match self.directory.find_patient(&user.email).await {
            Ok(record) => record,
            Err(err) => {
                warn!(user_id = %user.id, "patient record lookup failed: {err}");
                None
            }
        };

        let Some(record) = record else {
            warn!(user_id = %user.id, "signed-in account has no patient record, signing out");
            self.force_sign_out().await;
            return Err(AccessError::EnrollmentDenied);
        };

        let session = LocalSession::new(&record, Utc::now());
        if let Err(err) = self.storage.write(&session) {
            warn!(patient_id = %session.id, "local patient session not saved, signing out: {err}");
            self.force_sign_out().await;
            return Err(AccessError::SessionNotSaved(err.to_string()));
        }
        info!(patient_id = %session.id, "patient session established");

        Ok(Admission {
            session,
            destination: PATIENT_LANDING,
        })
    }

    async fn force_sign_out(&self) {
        if let Err(err) = self.auth.sign_out().await {
            warn!("forced sign-out failed: {err}");
        }
    }

    /// Reacts to a session transition observed while the form was in `mode`.
    pub async fn handle_auth_event(&self, event: &AuthStateEvent, mode: FormMode) {
        if let AuthStateEvent::SignedIn(_) = event {
            if mode == FormMode::Registration {
                self.mark_registered_once("auth-state").await;
            }
        }
    }

    /// Feeds auth events to [`Self::handle_auth_event`] until the stream ends
    /// or `current_mode` returns `None`, meaning the form is gone.
    pub async fn listen<E>(&self, mut events: E, current_mode: impl Fn() -> Option<FormMode>)
    where
        E: Stream<Item = AuthStateEvent> + Unpin,
    {
        while let Some(event) = events.next().await {
            let Some(mode) = current_mode() else {
                debug!("auth listener stopped, form disposed");
                break;
            };
            self.handle_auth_event(&event, mode).await;
        }
    }

    /// Calls mark-registered unless the latch was already claimed. Failures
    /// are logged and never reach the user.
    async fn mark_registered_once(&self, trigger: &'static str) -> bool {
        if !self.latch.try_claim() {
            debug!(trigger, "patient already marked as registered");
            return false;
        }
        match self.directory.mark_registered().await {
            Ok(()) => info!(trigger, "patient marked as registered"),
            Err(err) => warn!(trigger, "{}", AccessError::SideEffect(err.to_string())),
        }
        true
    }
}
