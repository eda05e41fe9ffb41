use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{self, Account, Db};
use crate::flow::MIN_PASSWORD_LEN;

const MAX_FAILED_ATTEMPTS: i32 = 5;
const LOCKOUT_MINUTES: i64 = 15;
const CONFIRMATION_TTL_HOURS: i64 = 24;
const CONFIRM_KIND: &str = "confirm";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("User already registered")]
    EmailExists,
    #[error("Password should be at least {} characters", MIN_PASSWORD_LEN)]
    WeakPassword,
    #[error("Account locked, try again later")]
    AccountLocked,
    #[error("Invalid or expired confirmation link")]
    InvalidToken,
    #[error("Email not confirmed")]
    EmailNotConfirmed,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Other(String),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Other(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|h| Argon2::default().verify_password(password.as_bytes(), &h).is_ok())
        .unwrap_or(false)
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Creates an account. Unless `confirmed`, it cannot sign in until the email
/// confirmation token is consumed.
///
/// An account that exists but was never confirmed is taken over with the new
/// password, so a sign-up whose confirmation mail was lost can be retried.
pub async fn sign_up(
    db: &Db,
    email: &str,
    password: &str,
    confirmed: bool,
) -> Result<Account, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    let hash = hash_password(password)?;

    match db::get_account_by_email(db, email).await? {
        Some(existing) if existing.email_confirmed => return Err(AuthError::EmailExists),
        Some(existing) => {
            if db::reset_unconfirmed_account(db, &existing.id, &hash, confirmed).await? == 0 {
                return Err(AuthError::EmailExists);
            }
            info!(account_id = %existing.id, confirmed, "unconfirmed account signed up again");
        }
        None => {
            let id = Uuid::new_v4().to_string();
            db::create_account(db, &id, email, &hash, confirmed).await?;
            info!(account_id = %id, confirmed, "account created");
        }
    }

    db::get_account_by_email(db, email)
        .await?
        .ok_or_else(|| AuthError::Other("account vanished after creation".into()))
}

pub async fn sign_in(db: &Db, email: &str, password: &str) -> Result<Account, AuthError> {
    let account = db::get_account_by_email(db, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    // an expired lockout starts a fresh count
    let mut failed_attempts = account.failed_attempts;
    if let Some(ref locked) = account.locked_until {
        if chrono::DateTime::parse_from_rfc3339(locked)
            .map(|t| t > Utc::now())
            .unwrap_or(false)
        {
            return Err(AuthError::AccountLocked);
        }
        failed_attempts = 0;
    }

    if !verify_password(password, &account.password_hash) {
        let attempts = failed_attempts + 1;
        let locked = (attempts >= MAX_FAILED_ATTEMPTS)
            .then(|| (Utc::now() + Duration::minutes(LOCKOUT_MINUTES)).to_rfc3339());
        if locked.is_some() {
            warn!(account_id = %account.id, "account locked after repeated failures");
        }
        if let Err(err) =
            db::update_failed_attempts(db, &account.id, attempts, locked.as_deref()).await
        {
            warn!("failed to record sign-in attempt: {err}");
        }
        return Err(AuthError::InvalidCredentials);
    }

    if !account.email_confirmed {
        return Err(AuthError::EmailNotConfirmed);
    }

    if account.failed_attempts > 0 || account.locked_until.is_some() {
        db::update_failed_attempts(db, &account.id, 0, None).await?;
    }
    Ok(account)
}

pub async fn create_confirmation_token(db: &Db, account_id: &str) -> Result<String, AuthError> {
    let token = Uuid::new_v4().to_string();
    let expires = (Utc::now() + Duration::hours(CONFIRMATION_TTL_HOURS)).to_rfc3339();
    db::create_token(
        db,
        &Uuid::new_v4().to_string(),
        account_id,
        CONFIRM_KIND,
        &hash_token(&token),
        &expires,
    )
    .await?;
    Ok(token)
}

async fn consume_token(db: &Db, token: &str, kind: &str) -> Result<String, AuthError> {
    let (id, account_id, expires) = db::get_token(db, &hash_token(token), kind)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    db::delete_token(db, &id).await?;
    if chrono::DateTime::parse_from_rfc3339(&expires)
        .map(|t| t < Utc::now())
        .unwrap_or(true)
    {
        return Err(AuthError::InvalidToken);
    }
    Ok(account_id)
}

/// Consumes a confirmation token; returns the confirmed account's id and email.
pub async fn confirm_email(db: &Db, token: &str) -> Result<(String, String), AuthError> {
    let account_id = consume_token(db, token, CONFIRM_KIND).await?;
    let email = db::confirm_account_email(db, &account_id)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    info!(account_id = %account_id, "account email confirmed");
    Ok((account_id, email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn duplicate_and_weak_sign_ups_are_rejected() {
        let db = test_pool().await;
        assert!(matches!(
            sign_up(&db, "pat@clinic.com", "12345", false).await,
            Err(AuthError::WeakPassword)
        ));
        let account = sign_up(&db, "pat@clinic.com", "secret1", true).await.unwrap();
        assert!(account.email_confirmed);
        assert!(matches!(
            sign_up(&db, "PAT@clinic.com", "secret1", false).await,
            Err(AuthError::EmailExists)
        ));
    }

    #[tokio::test]
    async fn unconfirmed_sign_up_can_be_retried() {
        let db = test_pool().await;
        let first = sign_up(&db, "pat@clinic.com", "secret1", false).await.unwrap();
        // confirmation mail never arrived; the patient tries again
        let retry = sign_up(&db, "pat@clinic.com", "another1", false).await.unwrap();
        assert_eq!(retry.id, first.id);
        assert!(!retry.email_confirmed);

        let token = create_confirmation_token(&db, &retry.id).await.unwrap();
        confirm_email(&db, &token).await.unwrap();

        assert!(matches!(
            sign_in(&db, "pat@clinic.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(
            sign_in(&db, "pat@clinic.com", "another1").await.unwrap().id,
            first.id
        );
        assert!(matches!(
            sign_up(&db, "pat@clinic.com", "secret1", false).await,
            Err(AuthError::EmailExists)
        ));
    }

    #[tokio::test]
    async fn unconfirmed_account_cannot_sign_in_until_confirmed() {
        let db = test_pool().await;
        let account = sign_up(&db, "pat@clinic.com", "secret1", false).await.unwrap();
        assert!(matches!(
            sign_in(&db, "pat@clinic.com", "secret1").await,
            Err(AuthError::EmailNotConfirmed)
        ));

        let token = create_confirmation_token(&db, &account.id).await.unwrap();
        let (id, email) = confirm_email(&db, &token).await.unwrap();
        assert_eq!(id, account.id);
        assert_eq!(email, "pat@clinic.com");

        // single use
        assert!(matches!(
            confirm_email(&db, &token).await,
            Err(AuthError::InvalidToken)
        ));
        assert_eq!(
            sign_in(&db, "pat@clinic.com", "secret1").await.unwrap().id,
            account.id
        );
    }

    #[tokio::test]
    async fn repeated_failures_lock_the_account() {
        let db = test_pool().await;
        sign_up(&db, "pat@clinic.com", "secret1", true).await.unwrap();
        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert!(matches!(
                sign_in(&db, "pat@clinic.com", "wrong-pass").await,
                Err(AuthError::InvalidCredentials)
            ));
        }
        assert!(matches!(
            sign_in(&db, "pat@clinic.com", "secret1").await,
            Err(AuthError::AccountLocked)
        ));
    }

    #[tokio::test]
    async fn expired_lockout_starts_a_fresh_count() {
        let db = test_pool().await;
        let account = sign_up(&db, "pat@clinic.com", "secret1", true).await.unwrap();
        let expired = (Utc::now() - Duration::minutes(1)).to_rfc3339();
        db::update_failed_attempts(&db, &account.id, MAX_FAILED_ATTEMPTS, Some(&expired))
            .await
            .unwrap();

        assert!(matches!(
            sign_in(&db, "pat@clinic.com", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
        let after = db::get_account_by_email(&db, "pat@clinic.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.failed_attempts, 1);
        assert!(after.locked_until.is_none());

        assert_eq!(
            sign_in(&db, "pat@clinic.com", "secret1").await.unwrap().id,
            account.id
        );
    }
}
