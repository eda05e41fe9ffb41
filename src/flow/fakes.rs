//! In-memory collaborators for flow tests.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use chrono::Utc;
use futures::channel::{
    mpsc::{unbounded, UnboundedSender},
    oneshot,
};

use super::{AuthEvents, AuthService, LocalSession, PatientDirectory, ServiceError, SessionStorage};
use crate::models::{
    AuthSession, AuthStateEvent, PatientRecord, PatientStatusRow, SessionUser, SignUpResponse,
};

type RowsResult = Result<Vec<PatientStatusRow>, ServiceError>;

pub fn session_for(email: &str) -> AuthSession {
    AuthSession {
        user: SessionUser {
            id: format!("acct-{email}"),
            email: email.to_string(),
        },
        issued_at: Utc::now(),
    }
}

pub fn patient(id: &str, name: &str, email: &str) -> PatientRecord {
    PatientRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        psychologist_id: "psy-1".to_string(),
    }
}

/// Auth service that answers with preset results and counts calls.
#[derive(Default)]
pub struct FakeAuth {
    sign_up: Mutex<Option<Result<SignUpResponse, ServiceError>>>,
    sign_in: Mutex<Option<Result<SessionUser, ServiceError>>>,
    last_redirect: Mutex<Option<String>>,
    listeners: Mutex<Vec<UnboundedSender<AuthStateEvent>>>,
    sign_up_calls: AtomicUsize,
    sign_outs: AtomicUsize,
}

impl FakeAuth {
    pub fn set_sign_up(&self, result: Result<SignUpResponse, ServiceError>) {
        *self.sign_up.lock().unwrap() = Some(result);
    }

    pub fn set_sign_in(&self, result: Result<SessionUser, ServiceError>) {
        *self.sign_in.lock().unwrap() = Some(result);
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.last_redirect.lock().unwrap().clone()
    }

    pub fn emit(&self, event: AuthStateEvent) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }
}

impl AuthService for FakeAuth {
    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        redirect_to: &str,
    ) -> Result<SignUpResponse, ServiceError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_redirect.lock().unwrap() = Some(redirect_to.to_string());
        let result = self.sign_up.lock().unwrap().clone().unwrap_or(Ok(SignUpResponse::default()));
        if let Ok(SignUpResponse {
            session: Some(session),
            ..
        }) = &result
        {
            self.emit(AuthStateEvent::SignedIn(session.clone()));
        }
        result
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<SessionUser, ServiceError> {
        let result = self
            .sign_in
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ServiceError::new("Invalid login credentials")));
        if result.is_ok() {
            self.emit(AuthStateEvent::SignedIn(session_for(email)));
        }
        result
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.emit(AuthStateEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthEvents {
        let (tx, rx) = unbounded();
        self.listeners.lock().unwrap().push(tx);
        rx
    }
}

/// Patient directory backed by maps, with optionally deferred lookups.
#[derive(Default)]
pub struct FakeDirectory {
    rows: Mutex<HashMap<String, RowsResult>>,
    deferred: Mutex<HashMap<String, oneshot::Receiver<RowsResult>>>,
    patients: Mutex<Vec<PatientRecord>>,
    mark_error: Mutex<Option<ServiceError>>,
    patient_error: Mutex<Option<ServiceError>>,
    lookups: AtomicUsize,
    marks: AtomicUsize,
}

impl FakeDirectory {
    pub fn set_rows(&self, email: &str, result: RowsResult) {
        self.rows.lock().unwrap().insert(email.to_string(), result);
    }

    /// The lookup for `email` waits until the returned sender fires.
    pub fn defer_rows(&self, email: &str) -> oneshot::Sender<RowsResult> {
        let (tx, rx) = oneshot::channel();
        self.deferred.lock().unwrap().insert(email.to_string(), rx);
        tx
    }

    pub fn add_patient(&self, record: PatientRecord) {
        self.patients.lock().unwrap().push(record);
    }

    pub fn fail_marks(&self, err: ServiceError) {
        *self.mark_error.lock().unwrap() = Some(err);
    }

    pub fn fail_patients(&self, err: ServiceError) {
        *self.patient_error.lock().unwrap() = Some(err);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn marks(&self) -> usize {
        self.marks.load(Ordering::SeqCst)
    }
}

impl PatientDirectory for FakeDirectory {
    async fn lookup_status(&self, email: &str) -> RowsResult {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let deferred = self.deferred.lock().unwrap().remove(email);
        if let Some(rx) = deferred {
            return rx
                .await
                .unwrap_or_else(|_| Err(ServiceError::new("lookup dropped")));
        }
        self.rows
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .unwrap_or(Ok(vec![]))
    }

    async fn mark_registered(&self) -> Result<(), ServiceError> {
        self.marks.fetch_add(1, Ordering::SeqCst);
        match self.mark_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn find_patient(&self, email: &str) -> Result<Option<PatientRecord>, ServiceError> {
        if let Some(err) = self.patient_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .patients
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == email)
            .cloned())
    }
}

/// Storage that refuses every write.
pub struct FullStorage;

impl SessionStorage for FullStorage {
    fn read(&self) -> Option<LocalSession> {
        None
    }

    fn write(&self, _session: &LocalSession) -> Result<(), ServiceError> {
        Err(ServiceError::new("storage quota exceeded"))
    }

    fn clear(&self) {}
}
