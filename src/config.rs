use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:patient_portal.db";
const DEFAULT_EMAIL_FROM: &str = "no-reply@patient-portal.local";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool { name: &'static str, value: String },
}

/// Runtime settings read from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    /// Empty disables outgoing mail; links are logged instead.
    pub resend_api_key: String,
    pub email_from: String,
    pub base_url: String,
    /// Secure session cookies.
    pub production: bool,
    pub require_email_confirmation: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            resend_api_key: var_or("RESEND_API_KEY", ""),
            email_from: var_or("EMAIL_FROM", DEFAULT_EMAIL_FROM),
            base_url: var_or("BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            production: env::var("PRODUCTION").is_ok(),
            require_email_confirmation: match env::var("AUTH_REQUIRE_EMAIL_CONFIRMATION") {
                Ok(value) => parse_bool("AUTH_REQUIRE_EMAIL_CONFIRMATION", &value)?,
                Err(_) => true,
            },
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.into())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}
