use std::sync::Arc;

use crate::db::Db;
use crate::services::email::Email;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub email: Arc<Email>,
    pub auth: AuthSettings,
}

/// Auth service behaviour that depends on the deployment.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub require_email_confirmation: bool,
    pub base_url: String,
}

impl AuthSettings {
    /// Link target for a confirmation email. Redirects outside the portal fall
    /// back to the built-in confirmation page.
    pub fn confirmation_link(&self, redirect_to: &str, token: &str) -> String {
        let target = if redirect_to.starts_with(&format!("{}/", self.base_url)) {
            redirect_to.to_string()
        } else {
            format!("{}/auth/confirm", self.base_url)
        };
        format!("{target}?token={token}")
    }
}
