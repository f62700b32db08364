//! Authentication service - registration, login and password reset.
//!
//! Orchestrates the credential store, the password hasher, the token
//! issuer and the mailer. Hashing runs on the blocking pool.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::token_service::TokenIssuer;
use crate::config::{Config, RESET_MAIL_SUBJECT, RESET_MAIL_TEXT};
use crate::domain::{
    policy::{validate_email, validate_password},
    AuthResponse, HashCost, NewUser, Password, User,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{MailMessage, Mailer, UnitOfWork, DUPLICATE_EMAIL_MESSAGE};
use crate::utils::ResetEmailTemplate;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const NOT_AUTHORIZED_MESSAGE: &str = "Not authorized.";

// Hashed once and verified against when the email is unknown, so a
// failed login costs the same whether or not the account exists.
const DUMMY_PASSWORD: &str = "Dummy-Password-1!";

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and issue a session token
    async fn register(&self, name: String, email: String, password: String)
        -> AppResult<AuthResponse>;

    /// Check credentials and issue a session token
    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse>;

    /// Email a password reset link to the account owner
    async fn request_password_reset(&self, email: String) -> AppResult<()>;

    /// Set a new password using a reset token
    async fn confirm_password_reset(
        &self,
        user_id: Uuid,
        token: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Resolve a session token to the user it was issued for
    async fn authenticate(&self, token: &str) -> AppResult<User>;
}

/// Settings the auth flows need beyond the token issuer.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub hash_cost: HashCost,
    /// Front-end origin the reset link points at
    pub client_url: String,
    pub mail_from: String,
    pub conceal_unknown_reset_email: bool,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            hash_cost: config.hash_cost,
            client_url: config.client_url.clone(),
            mail_from: config.mail.from.clone(),
            conceal_unknown_reset_email: config.conceal_unknown_reset_email,
        }
    }
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: TokenIssuer,
    mailer: Arc<dyn Mailer>,
    template: ResetEmailTemplate,
    settings: AuthSettings,
    dummy_hash: OnceCell<String>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(
        uow: Arc<U>,
        tokens: TokenIssuer,
        mailer: Arc<dyn Mailer>,
        template: ResetEmailTemplate,
        settings: AuthSettings,
    ) -> Self {
        Self {
            uow,
            tokens,
            mailer,
            template,
            settings,
            dummy_hash: OnceCell::new(),
        }
    }

    async fn hash_password(&self, plain_text: String) -> AppResult<Password> {
        let cost = self.settings.hash_cost;
        tokio::task::spawn_blocking(move || Password::hash(&plain_text, &cost))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(hash: String, plain_text: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || Password::from_hash(hash).verify(&plain_text))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))
    }

    async fn dummy_hash(&self) -> AppResult<String> {
        self.dummy_hash
            .get_or_try_init(|| async {
                self.hash_password(DUMMY_PASSWORD.to_string())
                    .await
                    .map(Password::into_string)
            })
            .await
            .cloned()
    }

    fn reset_link(&self, user_id: Uuid, token: &str) -> String {
        format!(
            "{}/auth/reset-password/{}/{}",
            self.settings.client_url.trim_end_matches('/'),
            user_id,
            token
        )
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<AuthResponse> {
        let name = name.trim().to_string();
        let email = email.trim().to_string();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::validation(MISSING_FIELDS_MESSAGE));
        }

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(DUPLICATE_EMAIL_MESSAGE));
        }

        validate_email(&email)?;
        validate_password(&password)?;

        let password_hash = self.hash_password(password).await?.into_string();

        // The unique index still decides races between concurrent registrations
        let user = self
            .uow
            .users()
            .create(NewUser {
                name,
                email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        let token = self.tokens.issue_session(user.id)?;
        Ok(AuthResponse::new(user, token))
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        }

        let user = self.uow.users().find_by_email(email).await?;

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?,
        };
        let password_valid = Self::verify_password(hash, password).await?;

        match user {
            Some(user) if password_valid => {
                tracing::info!(user_id = %user.id, "User logged in");
                let token = self.tokens.issue_session(user.id)?;
                Ok(AuthResponse::new(user, token))
            }
            _ => {
                tracing::warn!("Failed login attempt");
                Err(AppError::unauthorized(INVALID_CREDENTIALS_MESSAGE))
            }
        }
    }

    async fn request_password_reset(&self, email: String) -> AppResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation(MISSING_FIELDS_MESSAGE));
        }

        let Some(user) = self.uow.users().find_by_email(email).await? else {
            if self.settings.conceal_unknown_reset_email {
                tracing::info!("Password reset requested for unknown email");
                return Ok(());
            }
            return Err(AppError::not_found("User"));
        };

        let token = self.tokens.issue_reset(&user)?;
        let link = self.reset_link(user.id, &token);
        let html = self.template.render(&user.email, &link);

        self.mailer
            .send(MailMessage {
                from: self.settings.mail_from.clone(),
                to: user.email.clone(),
                subject: RESET_MAIL_SUBJECT.to_string(),
                text: RESET_MAIL_TEXT.to_string(),
                html,
            })
            .await?;

        tracing::info!(user_id = %user.id, "Password reset email dispatched");
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        user_id: Uuid,
        token: String,
        new_password: String,
    ) -> AppResult<()> {
        if new_password.is_empty() {
            return Err(AppError::validation(MISSING_FIELDS_MESSAGE));
        }

        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User")?;

        self.tokens.verify_reset(&token, &user)?;
        validate_password(&new_password)?;

        let new_hash = self.hash_password(new_password).await?.into_string();

        // Compare-and-swap on the old hash: of two concurrent resets with
        // the same token, only one can win.
        let swapped = self
            .uow
            .users()
            .replace_password_hash(user.id, &user.password_hash, new_hash)
            .await?;

        if !swapped {
            tracing::warn!(user_id = %user.id, "Password changed while reset was in flight");
            return Err(AppError::InvalidToken);
        }

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self
            .tokens
            .verify_session(token)
            .map_err(|_| AppError::unauthorized(NOT_AUTHORIZED_MESSAGE))?;

        self.uow
            .users()
            .find_by_id(claims.id)
            .await?
            .ok_or_else(|| AppError::unauthorized(NOT_AUTHORIZED_MESSAGE))
    }
}
