use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, Sqlite,
};

use crate::models::{PatientRecord, PatientStatusRow};

pub type Db = Pool<Sqlite>;

// Auth account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub email_confirmed: bool,
    pub password_hash: String,
    pub created_at: String,
    pub failed_attempts: i32,
    pub locked_until: Option<String>,
}

// Enrolled patient, written by the clinic
#[derive(Debug, Clone, FromRow)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub psychologist_id: String,
    pub is_registered: bool,
    pub account_id: Option<String>,
    pub registered_at: Option<String>,
}

impl From<Patient> for PatientRecord {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            psychologist_id: p.psychologist_id,
        }
    }
}

pub async fn create_pool(url: &str) -> Result<Db, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(options)
        .await
}

// Create tables if they don't exist
pub async fn run_migrations(db: &Db) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            email_confirmed INTEGER NOT NULL DEFAULT 0,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            failed_attempts INTEGER NOT NULL DEFAULT 0,
            locked_until TEXT
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tokens (
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            hash TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            psychologist_id TEXT NOT NULL,
            is_registered INTEGER NOT NULL DEFAULT 0,
            account_id TEXT REFERENCES accounts(id) ON DELETE SET NULL,
            registered_at TEXT
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

// Account queries
pub async fn get_account_by_email(db: &Db, email: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM accounts WHERE email = ?")
        .bind(normalize(email))
        .fetch_optional(db)
        .await
}

pub async fn create_account(
    db: &Db,
    id: &str,
    email: &str,
    password_hash: &str,
    email_confirmed: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, email, email_confirmed, password_hash, created_at) VALUES (?, ?, ?, ?, datetime('now'))",
    )
    .bind(id)
    .bind(normalize(email))
    .bind(email_confirmed)
    .bind(password_hash)
    .execute(db)
    .await?;
    Ok(())
}

/// Replaces the credentials of an account that never confirmed its email.
pub async fn reset_unconfirmed_account(
    db: &Db,
    account_id: &str,
    password_hash: &str,
    email_confirmed: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE accounts SET password_hash = ?, email_confirmed = ?, failed_attempts = 0, locked_until = NULL WHERE id = ? AND email_confirmed = 0",
    )
    .bind(password_hash)
    .bind(email_confirmed)
    .bind(account_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn confirm_account_email(db: &Db, account_id: &str) -> Result<Option<String>, sqlx::Error> {
    let email: Option<(String,)> = sqlx::query_as(
        "UPDATE accounts SET email_confirmed = 1 WHERE id = ? RETURNING email",
    )
    .bind(account_id)
    .fetch_optional(db)
    .await?;
    Ok(email.map(|(e,)| e))
}

pub async fn update_failed_attempts(
    db: &Db,
    account_id: &str,
    count: i32,
    locked_until: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE accounts SET failed_attempts = ?, locked_until = ? WHERE id = ?")
        .bind(count)
        .bind(locked_until)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(())
}

// Token queries
pub async fn create_token(
    db: &Db,
    id: &str,
    account_id: &str,
    kind: &str,
    hash: &str,
    expires_at: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tokens (id, account_id, kind, hash, expires_at) VALUES (?, ?, ?, ?, ?)")
        .bind(id)
        .bind(account_id)
        .bind(kind)
        .bind(hash)
        .bind(expires_at)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn get_token(
    db: &Db,
    hash: &str,
    kind: &str,
) -> Result<Option<(String, String, String)>, sqlx::Error> {
    sqlx::query_as("SELECT id, account_id, expires_at FROM tokens WHERE hash = ? AND kind = ?")
        .bind(hash)
        .bind(kind)
        .fetch_optional(db)
        .await
}

pub async fn delete_token(db: &Db, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tokens WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

// Patient queries
pub async fn insert_patient(
    db: &Db,
    id: &str,
    name: &str,
    email: &str,
    psychologist_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO patients (id, name, email, psychologist_id) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(normalize(email))
        .bind(psychologist_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Existence and registration flags only; an unknown email yields one row
/// with both flags false.
pub async fn patient_email_status(db: &Db, email: &str) -> Result<Vec<PatientStatusRow>, sqlx::Error> {
    let registered: Option<(bool,)> =
        sqlx::query_as("SELECT is_registered FROM patients WHERE email = ? LIMIT 1")
            .bind(normalize(email))
            .fetch_optional(db)
            .await?;
    Ok(vec![PatientStatusRow {
        email_exists: registered.is_some(),
        is_registered: registered.is_some_and(|(r,)| r),
    }])
}

/// Idempotent: the first registration's account and timestamp are kept.
pub async fn mark_patient_registered(
    db: &Db,
    email: &str,
    account_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE patients SET
            is_registered = 1,
            account_id = COALESCE(account_id, ?),
            registered_at = COALESCE(registered_at, datetime('now'))
        WHERE email = ?
        "#,
    )
    .bind(account_id)
    .bind(normalize(email))
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn get_patient_by_email(db: &Db, email: &str) -> Result<Option<Patient>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM patients WHERE email = ? LIMIT 1")
        .bind(normalize(email))
        .fetch_optional(db)
        .await
}

#[cfg(test)]
pub(crate) async fn test_pool() -> Db {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&db).await.expect("migrations");
    db
}
