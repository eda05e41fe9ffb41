//! Patient procedures run with server privileges.
//!
//! The status lookup is the only path open to anonymous callers and it only
//! ever reveals two flags. Patient rows themselves are visible to the signed-in
//! principal whose email matches the row, and to nobody else.

use tracing::{debug, info};

use crate::db::{self, Db};
use crate::models::{PatientRecord, PatientStatusRow, SessionUser};

pub async fn email_status(db: &Db, email: &str) -> Result<Vec<PatientStatusRow>, sqlx::Error> {
    db::patient_email_status(db, email).await
}

/// Marks the principal's patient as registered. Returns whether a patient row
/// matched the principal.
pub async fn mark_registered(db: &Db, principal: &SessionUser) -> Result<bool, sqlx::Error> {
    let updated = db::mark_patient_registered(db, &principal.email, &principal.id).await?;
    if updated == 0 {
        debug!(account_id = %principal.id, "no patient row for principal");
        return Ok(false);
    }
    info!(account_id = %principal.id, "patient registration recorded");
    Ok(true)
}

/// Same as [`mark_registered`], for callers holding only the account email
/// (email confirmation).
pub async fn mark_registered_by_email(
    db: &Db,
    account_id: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    mark_registered(
        db,
        &SessionUser {
            id: account_id.to_string(),
            email: email.to_string(),
        },
    )
    .await
}

/// Row-level read: the principal only sees their own patient row.
pub async fn find_for_principal(
    db: &Db,
    principal: &SessionUser,
    email: &str,
) -> Result<Option<PatientRecord>, sqlx::Error> {
    if !principal.email.trim().eq_ignore_ascii_case(email.trim()) {
        debug!(account_id = %principal.id, "patient row hidden from principal");
        return Ok(None);
    }
    Ok(db::get_patient_by_email(db, email).await?.map(PatientRecord::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_patient, test_pool};

    fn principal(email: &str) -> SessionUser {
        SessionUser {
            id: "a1".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn principal_sees_only_own_row() {
        let db = test_pool().await;
        insert_patient(&db, "p1", "Pat", "pat@clinic.com", "psy-1").await.unwrap();
        insert_patient(&db, "p2", "Sam", "sam@clinic.com", "psy-1").await.unwrap();

        let own = find_for_principal(&db, &principal("pat@clinic.com"), "pat@clinic.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(own.id, "p1");
        assert_eq!(own.psychologist_id, "psy-1");

        let other = find_for_principal(&db, &principal("pat@clinic.com"), "sam@clinic.com")
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn confirmed_email_marks_patient_registered() {
        let db = test_pool().await;
        insert_patient(&db, "p1", "Pat", "pat@clinic.com", "psy-1").await.unwrap();
        let before = email_status(&db, "pat@clinic.com").await.unwrap();
        assert!(before[0].email_exists && !before[0].is_registered);

        assert!(mark_registered_by_email(&db, "a1", "Pat@Clinic.com").await.unwrap());

        let after = email_status(&db, "pat@clinic.com").await.unwrap();
        assert_eq!(
            after,
            vec![PatientStatusRow {
                email_exists: true,
                is_registered: true
            }]
        );
    }

    #[tokio::test]
    async fn principal_without_patient_row_marks_nothing() {
        let db = test_pool().await;
        assert!(!mark_registered(&db, &principal("stranger@clinic.com")).await.unwrap());
    }
}
