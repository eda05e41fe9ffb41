use leptos::prelude::*;

use crate::models::{PatientRecord, PatientStatusRow};

/// Existence and registration flags for an email. Open to anonymous callers,
/// it never returns patient data.
#[server]
pub async fn check_patient_email(p_email: String) -> Result<Vec<PatientStatusRow>, ServerFnError> {
    use crate::server_fns::context::{app_state, internal_error};
    use crate::services::patients;

    let state = app_state().await?;
    patients::email_status(&state.db, &p_email)
        .await
        .map_err(internal_error)
}

#[server]
pub async fn mark_patient_registered() -> Result<(), ServerFnError> {
    use crate::server_fns::context::{app_state, internal_error, require_principal, session};
    use crate::services::patients;

    let state = app_state().await?;
    let principal = require_principal(&session().await?).await?;
    patients::mark_registered(&state.db, &principal)
        .await
        .map_err(internal_error)?;
    Ok(())
}

#[server]
pub async fn get_patient_by_email(email: String) -> Result<Option<PatientRecord>, ServerFnError> {
    use crate::server_fns::context::{app_state, internal_error, require_principal, session};
    use crate::services::patients;

    let state = app_state().await?;
    let principal = require_principal(&session().await?).await?;
    patients::find_for_principal(&state.db, &principal, &email)
        .await
        .map_err(internal_error)
}
