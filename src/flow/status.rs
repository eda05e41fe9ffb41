use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tracing::{debug, warn};

use super::{AccessError, PatientDirectory, PatientForm};
use crate::models::PatientStatus;

/// Outcome of a status lookup for one keystroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The email has no `@`, nothing was asked.
    Skipped,
    /// A newer lookup was issued while this one was in flight.
    Superseded,
    Applied(PatientStatus),
}

/// Resolves the patient status of candidate emails, newest request wins.
pub struct StatusResolver<D> {
    directory: Arc<D>,
    issued: Arc<AtomicU64>,
}

impl<D> Clone for StatusResolver<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            issued: Arc::clone(&self.issued),
        }
    }
}

impl<D: PatientDirectory> StatusResolver<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self {
            directory,
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn resolve(&self, email: &str) -> StatusUpdate {
        if !PatientForm::should_resolve(email) {
            return StatusUpdate::Skipped;
        }

        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let status = match self.directory.lookup_status(email).await {
            Ok(rows) => rows
                .into_iter()
                .next()
                .map(PatientStatus::from)
                .unwrap_or_else(PatientStatus::not_found),
            Err(err) => {
                warn!("{}", AccessError::Lookup(err.to_string()));
                PatientStatus::not_found()
            }
        };

        if self.issued.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding superseded patient status");
            return StatusUpdate::Superseded;
        }
        StatusUpdate::Applied(status)
    }
}
