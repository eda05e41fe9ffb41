use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity held in the server session once credentials are verified.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

/// An active auth session as reported back to the browser.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub user: SessionUser,
    pub issued_at: DateTime<Utc>,
}

/// Result of an account creation request.
///
/// `session` is only present when the account was usable immediately; when an
/// email confirmation is pending the caller gets the user alone.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct SignUpResponse {
    pub user: Option<SessionUser>,
    pub session: Option<AuthSession>,
}

/// Session transitions pushed to auth-state subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthStateEvent {
    SignedIn(AuthSession),
    SignedOut,
}
