use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::models::PatientRecord;

/// Storage key holding the serialized local patient session.
pub const PATIENT_SESSION_KEY: &str = "patientSession";

/// How long a local patient session is trusted after login.
pub const SESSION_TTL_HOURS: i64 = 12;

/// Client-side mirror of the patient record, written after a successful login.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocalSession {
    pub id: String,
    pub name: String,
    pub email: String,
    pub psychologist_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LocalSession {
    pub fn new(record: &PatientRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            psychologist_id: record.psychologist_id.clone(),
            created_at: now,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Where the local patient session lives between page loads.
pub trait SessionStorage {
    fn read(&self) -> Option<LocalSession>;

    fn write(&self, session: &LocalSession) -> Result<(), ServiceError>;

    fn clear(&self);

    /// Returns the stored session unless it has expired, clearing expired ones.
    fn load_active(&self, now: DateTime<Utc>) -> Option<LocalSession> {
        let session = self.read()?;
        if session.is_expired(now) {
            tracing::debug!(patient_id = %session.id, "dropping expired patient session");
            self.clear();
            return None;
        }
        Some(session)
    }
}

/// Process-local storage, used on the server and in tests.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<LocalSession>>,
}

impl SessionStorage for MemorySessionStorage {
    fn read(&self) -> Option<LocalSession> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn write(&self, session: &LocalSession) -> Result<(), ServiceError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ServiceError::new("session storage is unavailable"))?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

/// Browser `localStorage` under [`PATIENT_SESSION_KEY`].
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSessionStorage;

#[cfg(feature = "hydrate")]
impl BrowserSessionStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(feature = "hydrate")]
impl SessionStorage for BrowserSessionStorage {
    fn read(&self) -> Option<LocalSession> {
        let raw = Self::storage()?.get_item(PATIENT_SESSION_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!("discarding unreadable patient session: {err}");
                self.clear();
                None
            }
        }
    }

    fn write(&self, session: &LocalSession) -> Result<(), ServiceError> {
        let storage =
            Self::storage().ok_or_else(|| ServiceError::new("local storage is unavailable"))?;
        let raw = serde_json::to_string(session).map_err(|e| ServiceError::new(e.to_string()))?;
        storage
            .set_item(PATIENT_SESSION_KEY, &raw)
            .map_err(|_| ServiceError::new("could not save the patient session"))
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(PATIENT_SESSION_KEY);
        }
    }
}

#[cfg(feature = "hydrate")]
pub type PlatformSessionStorage = BrowserSessionStorage;
#[cfg(not(feature = "hydrate"))]
pub type PlatformSessionStorage = MemorySessionStorage;
