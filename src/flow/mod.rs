//! Patient identity resolution and session establishment.
//!
//! The form on the access page is driven by three pieces: the [`StatusResolver`]
//! asks the clinic whether an email belongs to a patient and whether that
//! patient already has an account, the [`PatientForm`] turns the answer into
//! either a login or a registration form, and the [`SessionEstablisher`] talks
//! to the auth service on submit and records the local patient session.
//!
//! Remote collaborators sit behind the traits below so the whole flow runs
//! against in-memory fakes in tests.

#![allow(async_fn_in_trait)]

mod client;
mod error;
mod establish;
mod form;
mod session;
mod status;

#[cfg(test)]
mod fakes;

pub use client::*;
pub use error::*;
pub use establish::*;
pub use form::*;
pub use session::*;
pub use status::*;

use futures::channel::mpsc::UnboundedReceiver;

use crate::models::{PatientRecord, PatientStatusRow, SessionUser, SignUpResponse};

/// Stream of session transitions delivered to a subscriber.
pub type AuthEvents = UnboundedReceiver<crate::models::AuthStateEvent>;

/// Credential-based account service.
pub trait AuthService {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpResponse, ServiceError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ServiceError>;

    async fn sign_out(&self) -> Result<(), ServiceError>;

    /// Registers a listener for session transitions. Events are delivered
    /// after the call that caused them has returned.
    fn subscribe(&self) -> AuthEvents;
}

/// Privileged patient procedures and the row-level secured patient store.
pub trait PatientDirectory {
    /// Existence and registration flags for `email`. Never returns the record.
    async fn lookup_status(&self, email: &str) -> Result<Vec<PatientStatusRow>, ServiceError>;

    /// Marks the currently signed-in principal's patient as registered.
    async fn mark_registered(&self) -> Result<(), ServiceError>;

    /// At most one patient whose email matches exactly.
    async fn find_patient(&self, email: &str) -> Result<Option<PatientRecord>, ServiceError>;
}
