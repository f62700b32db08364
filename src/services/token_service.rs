//! Token issuer/verifier.
//!
//! Session tokens are HS256 JWTs signed with the server secret. Reset
//! tokens are signed with `server secret ++ current password hash`, so
//! any password change silently invalidates every reset token issued
//! before it. The derived key is rebuilt from the stored hash on each
//! verification and never cached.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, MAX_RESET_TOKEN_HOURS, MAX_SESSION_TOKEN_DAYS};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

/// Session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Reset token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub email: String,
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and validates session and reset tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    session_ttl: Duration,
    reset_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("session_ttl", &self.session_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], session_ttl: Duration, reset_ttl: Duration) -> Self {
        Self {
            secret: secret.to_vec(),
            session_ttl,
            reset_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret_bytes(),
            Duration::days(config.session_token_days.clamp(1, MAX_SESSION_TOKEN_DAYS)),
            Duration::hours(config.reset_token_hours.clamp(1, MAX_RESET_TOKEN_HOURS)),
        )
    }

    /// Issue a session token for `user_id`.
    pub fn issue_session(&self, user_id: Uuid) -> AppResult<String> {
        self.issue_session_at(user_id, Utc::now())
    }

    fn issue_session_at(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<String> {
        let claims = SessionClaims {
            id: user_id,
            iat: now.timestamp(),
            exp: expiry(now, self.session_ttl)?,
        };
        sign(&claims, &self.secret)
    }

    /// Verify a session token. Malformed, tampered and expired tokens all
    /// fail with `InvalidToken`.
    pub fn verify_session(&self, token: &str) -> AppResult<SessionClaims> {
        verify(token, &self.secret)
    }

    /// Issue a reset token bound to the user's current password hash.
    pub fn issue_reset(&self, user: &User) -> AppResult<String> {
        self.issue_reset_at(user, Utc::now())
    }

    fn issue_reset_at(&self, user: &User, now: DateTime<Utc>) -> AppResult<String> {
        let claims = ResetClaims {
            email: user.email.clone(),
            id: user.id,
            iat: now.timestamp(),
            exp: expiry(now, self.reset_ttl)?,
        };
        sign(&claims, &self.reset_key(&user.password_hash))
    }

    /// Verify a reset token against the user's *current* password hash.
    pub fn verify_reset(&self, token: &str, user: &User) -> AppResult<ResetClaims> {
        let claims: ResetClaims = verify(token, &self.reset_key(&user.password_hash))?;
        if claims.id != user.id {
            tracing::debug!(user_id = %user.id, "Reset token issued for another user");
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    fn reset_key(&self, password_hash: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.secret.len() + password_hash.len());
        key.extend_from_slice(&self.secret);
        key.extend_from_slice(password_hash.as_bytes());
        key
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> AppResult<i64> {
    now.checked_add_signed(ttl)
        .map(|exp| exp.timestamp())
        .ok_or_else(|| AppError::internal("Token expiry out of range"))
}

fn sign<T: Serialize>(claims: &T, key: &[u8]) -> AppResult<String> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(key))
        .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, key: &[u8]) -> AppResult<T> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<T>(token, &DecodingKey::from_secret(key), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AppError::InvalidToken
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret-with-at-least-32-chars";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::days(30), Duration::days(1))
    }

    fn user_with_hash(hash: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "A".to_string(),
            "a@b.com".to_string(),
            hash.to_string(),
        )
    }

    /// Change one character inside the signature segment.
    fn tamper(token: &str) -> String {
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.as_bytes().to_vec();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_session_round_trip() {
        let id = Uuid::new_v4();
        let token = issuer().issue_session(id).unwrap();
        let claims = issuer().verify_session(&token).unwrap();

        assert_eq!(claims.id, id);
        assert_eq!(claims.exp - claims.iat, Duration::days(30).num_seconds());
    }

    #[test]
    fn test_session_valid_before_expiry() {
        let id = Uuid::new_v4();
        let issued = Utc::now() - Duration::days(29);
        let token = issuer().issue_session_at(id, issued).unwrap();

        assert_eq!(issuer().verify_session(&token).unwrap().id, id);
    }

    #[test]
    fn test_session_expired() {
        let issued = Utc::now() - Duration::days(30) - Duration::seconds(5);
        let token = issuer().issue_session_at(Uuid::new_v4(), issued).unwrap();

        assert!(matches!(
            issuer().verify_session(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_session_tampered_signature() {
        let token = issuer().issue_session(Uuid::new_v4()).unwrap();
        assert!(matches!(
            issuer().verify_session(&tamper(&token)),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_session_tampered_payload() {
        let token = issuer().issue_session(Uuid::new_v4()).unwrap();
        let other = issuer().issue_session(Uuid::new_v4()).unwrap();

        // Header and signature from one token, payload from another
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(issuer().verify_session(&forged).is_err());
    }

    #[test]
    fn test_session_wrong_secret() {
        let token = issuer().issue_session(Uuid::new_v4()).unwrap();
        let other = TokenIssuer::new(
            b"a-completely-different-32-char-secret",
            Duration::days(30),
            Duration::days(1),
        );
        assert!(other.verify_session(&token).is_err());
    }

    #[test]
    fn test_session_malformed() {
        assert!(issuer().verify_session("").is_err());
        assert!(issuer().verify_session("not.a.jwt").is_err());
    }

    #[test]
    fn test_reset_round_trip() {
        let user = user_with_hash("$argon2id$hash-one");
        let token = issuer().issue_reset(&user).unwrap();
        let claims = issuer().verify_reset(&token, &user).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, user.email);
    }

    #[test]
    fn test_reset_invalid_after_password_change() {
        let mut user = user_with_hash("$argon2id$hash-one");
        let token = issuer().issue_reset(&user).unwrap();

        user.password_hash = "$argon2id$hash-two".to_string();
        assert!(matches!(
            issuer().verify_reset(&token, &user),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_reset_expired() {
        let user = user_with_hash("$argon2id$hash-one");
        let issued = Utc::now() - Duration::days(1) - Duration::seconds(5);
        let token = issuer().issue_reset_at(&user, issued).unwrap();

        assert!(issuer().verify_reset(&token, &user).is_err());
    }

    #[test]
    fn test_reset_token_for_other_user_rejected() {
        let alice = user_with_hash("$argon2id$shared");
        let mut bob = user_with_hash("$argon2id$shared");
        bob.email = "bob@b.com".to_string();

        let token = issuer().issue_reset(&alice).unwrap();
        assert!(issuer().verify_reset(&token, &bob).is_err());
    }

    #[test]
    fn test_session_token_is_not_a_reset_token() {
        let user = user_with_hash("$argon2id$hash-one");
        let session = issuer().issue_session(user.id).unwrap();
        assert!(issuer().verify_reset(&session, &user).is_err());
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let far = Duration::days(100_000_000);
        let huge = TokenIssuer::new(SECRET, far, far);
        let user = user_with_hash("$argon2id$hash-one");

        assert!(matches!(
            huge.issue_session(user.id),
            Err(AppError::Internal(_))
        ));
        assert!(matches!(huge.issue_reset(&user), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_from_config_clamps_lifetimes() {
        let mut config = Config::with_secret(std::str::from_utf8(SECRET).unwrap()).unwrap();
        config.session_token_days = 200_000_000;
        config.reset_token_hours = 200_000_000;

        let issuer = TokenIssuer::from_config(&config);
        assert_eq!(issuer.session_ttl, Duration::days(MAX_SESSION_TOKEN_DAYS));
        assert_eq!(issuer.reset_ttl, Duration::hours(MAX_RESET_TOKEN_HOURS));
        assert!(issuer.issue_session(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        assert!(!format!("{:?}", issuer()).contains("unit-test-secret"));
    }
}
