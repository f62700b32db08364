//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use super::constants::{
    DEFAULT_CLIENT_URL, DEFAULT_DATABASE_URL, DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB,
    DEFAULT_HASH_PARALLELISM, DEFAULT_MAIL_FROM, DEFAULT_RESET_TOKEN_HOURS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_TOKEN_DAYS, DEFAULT_SMTP_PORT,
    MAX_RESET_TOKEN_HOURS, MAX_SESSION_TOKEN_DAYS, MIN_JWT_SECRET_LENGTH,
};
use crate::domain::HashCost;
use crate::errors::{AppError, AppResult};

/// Outbound mail settings
#[derive(Clone)]
pub struct MailSettings {
    /// SMTP relay host; `None` means emails are logged instead of sent
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    smtp_pass: Option<String>,
    pub from: String,
}

impl MailSettings {
    pub fn new(smtp_host: Option<String>, smtp_port: u16, from: impl Into<String>) -> Self {
        Self {
            smtp_host,
            smtp_port,
            smtp_user: None,
            smtp_pass: None,
            from: from.into(),
        }
    }

    pub fn with_credentials(mut self, user: String, pass: String) -> Self {
        self.smtp_user = Some(user);
        self.smtp_pass = Some(pass);
        self
    }

    /// SMTP password, if configured.
    pub fn smtp_pass(&self) -> Option<&str> {
        self.smtp_pass.as_deref()
    }
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &"[REDACTED]")
            .field("from", &self.from)
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub session_token_days: i64,
    pub reset_token_hours: i64,
    pub client_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub hash_cost: HashCost,
    pub mail: MailSettings,
    pub reset_template_path: Option<String>,
    /// Answer reset requests for unknown emails as if they succeeded
    pub conceal_unknown_reset_email: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("session_token_days", &self.session_token_days)
            .field("reset_token_hours", &self.reset_token_hours)
            .field("client_url", &self.client_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("hash_cost", &self.hash_cost)
            .field("mail", &self.mail)
            .field("reset_template_path", &self.reset_template_path)
            .field("conceal_unknown_reset_email", &self.conceal_unknown_reset_email)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in a release build, is too short,
    /// or if a numeric variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let hash_cost = HashCost {
            memory_kib: parse_var("HASH_MEMORY_KIB", DEFAULT_HASH_MEMORY_KIB)?,
            iterations: parse_var("HASH_ITERATIONS", DEFAULT_HASH_ITERATIONS)?,
            parallelism: parse_var("HASH_PARALLELISM", DEFAULT_HASH_PARALLELISM)?,
        };

        let mut mail = MailSettings::new(
            env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            parse_var("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_MAIL_FROM.to_string()),
        );
        if let (Ok(user), Ok(pass)) = (env::var("SMTP_USER"), env::var("SMTP_PASS")) {
            mail = mail.with_credentials(user, pass);
        }

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            session_token_days: parse_var("SESSION_TOKEN_DAYS", DEFAULT_SESSION_TOKEN_DAYS)?,
            reset_token_hours: parse_var("RESET_TOKEN_HOURS", DEFAULT_RESET_TOKEN_HOURS)?,
            client_url: env::var("CLIENT_URL")
                .unwrap_or_else(|_| DEFAULT_CLIENT_URL.to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            hash_cost,
            mail,
            reset_template_path: env::var("RESET_TEMPLATE_PATH").ok(),
            conceal_unknown_reset_email: parse_var("RESET_CONCEAL_UNKNOWN_EMAIL", false)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Build a configuration for a given secret with every other value at its default.
    pub fn with_secret(jwt_secret: impl Into<String>) -> AppResult<Self> {
        let config = Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            session_token_days: DEFAULT_SESSION_TOKEN_DAYS,
            reset_token_hours: DEFAULT_RESET_TOKEN_HOURS,
            client_url: DEFAULT_CLIENT_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            hash_cost: HashCost::default(),
            mail: MailSettings::new(None, DEFAULT_SMTP_PORT, DEFAULT_MAIL_FROM),
            reset_template_path: None,
            conceal_unknown_reset_email: false,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }
        if !(1..=MAX_SESSION_TOKEN_DAYS).contains(&self.session_token_days) {
            return Err(AppError::internal(format!(
                "SESSION_TOKEN_DAYS must be between 1 and {}",
                MAX_SESSION_TOKEN_DAYS
            )));
        }
        if !(1..=MAX_RESET_TOKEN_HOURS).contains(&self.reset_token_hours) {
            return Err(AppError::internal(format!(
                "RESET_TOKEN_HOURS must be between 1 and {}",
                MAX_RESET_TOKEN_HOURS
            )));
        }
        Ok(())
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::internal(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
