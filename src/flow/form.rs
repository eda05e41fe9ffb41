use crate::models::{FormMode, PatientStatus};

/// What the access form currently presents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormView {
    /// No email has been resolved yet.
    Unknown,
    /// The last lookup found no patient for the email.
    NotFound,
    Registration,
    Login,
}

/// Field values and the last resolved status behind the patient access form.
///
/// The mode is always derived from `status`, except right after a registration
/// completes: the form then stays in login until a new status is applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientForm {
    email: String,
    password: String,
    confirm_password: String,
    status: Option<PatientStatus>,
    registration_done: bool,
}

/// Snapshot of the form taken when the user submits.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub mode: FormMode,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub email_exists: bool,
}

impl PatientForm {
    /// A lookup is only worth issuing once the email contains an `@`.
    pub fn should_resolve(email: &str) -> bool {
        email.contains('@')
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirm_password(&self) -> &str {
        &self.confirm_password
    }

    pub fn status(&self) -> Option<PatientStatus> {
        self.status
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_confirm_password(&mut self, confirm_password: impl Into<String>) {
        self.confirm_password = confirm_password.into();
    }

    pub fn apply_status(&mut self, status: PatientStatus) {
        self.status = Some(status);
        self.registration_done = false;
    }

    pub fn mode(&self) -> FormMode {
        if self.registration_done {
            return FormMode::Login;
        }
        self.status.map(|s| s.form_mode()).unwrap_or_default()
    }

    pub fn view(&self) -> FormView {
        match self.status {
            None => FormView::Unknown,
            Some(status) if !status.email_exists => FormView::NotFound,
            Some(_) => match self.mode() {
                FormMode::Registration => FormView::Registration,
                FormMode::Login => FormView::Login,
            },
        }
    }

    pub fn shows_not_found_hint(&self) -> bool {
        self.view() == FormView::NotFound
    }

    fn email_exists(&self) -> bool {
        self.status.is_some_and(|s| s.email_exists)
    }

    /// Whether the submit control is enabled, ignoring any request in flight.
    pub fn can_submit(&self) -> bool {
        if self.email.is_empty() || self.password.is_empty() {
            return false;
        }
        match self.view() {
            FormView::Unknown | FormView::NotFound => false,
            FormView::Login => true,
            FormView::Registration => !self.confirm_password.is_empty() && self.email_exists(),
        }
    }

    pub fn submission(&self) -> Submission {
        Submission {
            mode: self.mode(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            email_exists: self.email_exists(),
        }
    }

    /// Returns to login after a registration attempt went through.
    pub fn complete_registration(&mut self) {
        self.registration_done = true;
        self.password.clear();
        self.confirm_password.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(email_exists: bool, is_registered: bool) -> PatientStatus {
        PatientStatus {
            email_exists,
            is_registered,
        }
    }

    fn filled(status_value: PatientStatus) -> PatientForm {
        let mut form = PatientForm::default();
        form.set_email("pat@clinic.com");
        form.set_password("secret1");
        form.set_confirm_password("secret1");
        form.apply_status(status_value);
        form
    }

    #[test]
    fn starts_unknown_in_login_mode() {
        let form = PatientForm::default();
        assert_eq!(form.view(), FormView::Unknown);
        assert_eq!(form.mode(), FormMode::Login);
        assert!(!form.can_submit());
    }

    #[test]
    fn resolve_gate_is_the_at_sign() {
        assert!(!PatientForm::should_resolve("patclinic.com"));
        assert!(!PatientForm::should_resolve(""));
        assert!(PatientForm::should_resolve("pat@"));
    }

    #[test]
    fn empty_email_or_password_blocks_submit_in_every_mode() {
        for s in [status(true, true), status(true, false)] {
            let mut form = filled(s);
            form.set_password("");
            assert!(!form.can_submit());

            let mut form = filled(s);
            form.set_email("");
            assert!(!form.can_submit());
        }
    }

    #[test]
    fn not_found_keeps_login_but_blocks_submit() {
        let form = filled(status(false, false));
        assert_eq!(form.mode(), FormMode::Login);
        assert_eq!(form.view(), FormView::NotFound);
        assert!(form.shows_not_found_hint());
        assert!(!form.can_submit());
    }

    #[test]
    fn registration_needs_confirmation_field() {
        let mut form = filled(status(true, false));
        assert_eq!(form.view(), FormView::Registration);
        assert!(form.can_submit());

        form.set_confirm_password("");
        assert!(!form.can_submit());
    }

    #[test]
    fn registered_patient_gets_login() {
        let mut form = filled(status(true, true));
        form.set_confirm_password("");
        assert_eq!(form.view(), FormView::Login);
        assert!(form.can_submit());
    }

    #[test]
    fn completed_registration_resets_to_login_and_clears_passwords() {
        let mut form = filled(status(true, false));
        form.complete_registration();

        assert_eq!(form.mode(), FormMode::Login);
        assert_eq!(form.view(), FormView::Login);
        assert!(form.password().is_empty());
        assert!(form.confirm_password().is_empty());
        assert_eq!(form.email(), "pat@clinic.com");

        // the next resolved status drives the mode again
        form.apply_status(status(true, false));
        assert_eq!(form.mode(), FormMode::Registration);
    }

    #[test]
    fn submission_carries_mode_and_existence() {
        let submission = filled(status(true, false)).submission();
        assert_eq!(submission.mode, FormMode::Registration);
        assert!(submission.email_exists);
        assert_eq!(submission.confirm_password, "secret1");
    }
}
