use serde::{Deserialize, Serialize};

/// One row of the privileged existence lookup.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientStatusRow {
    pub email_exists: bool,
    pub is_registered: bool,
}

/// Existence and registration flags resolved for a candidate email.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PatientStatus {
    pub email_exists: bool,
    pub is_registered: bool,
}

impl PatientStatus {
    /// Fail-closed status used for empty or failed lookups.
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn form_mode(&self) -> FormMode {
        if self.email_exists && !self.is_registered {
            FormMode::Registration
        } else {
            FormMode::Login
        }
    }
}

impl From<PatientStatusRow> for PatientStatus {
    fn from(row: PatientStatusRow) -> Self {
        Self {
            email_exists: row.email_exists,
            is_registered: row.is_registered,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Login,
    Registration,
}

/// Patient enrollment as stored by the clinic.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub psychologist_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_only_for_known_unregistered_email() {
        let cases = [
            (false, false, FormMode::Login),
            (false, true, FormMode::Login),
            (true, false, FormMode::Registration),
            (true, true, FormMode::Login),
        ];
        for (email_exists, is_registered, expected) in cases {
            let status = PatientStatus {
                email_exists,
                is_registered,
            };
            assert_eq!(status.form_mode(), expected, "{status:?}");
        }
    }
}
