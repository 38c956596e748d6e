//! Domain service for login and bearer-token checks.

use serde::Serialize;
use thiserror::Error;

use crate::models::UserDto;
use crate::services::credentials::{Claims, CredentialError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidToken => Self::InvalidToken,
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserDto,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Checks a bearer token's signature and expiry, then reloads the account.
    ///
    /// The returned claims carry the stored role and email, so a demoted or
    /// deleted account loses its rights before the token expires.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for a bad token and
    /// [`AuthError::UserNotFound`] when the account no longer exists.
    async fn authenticate(&self, token: &str) -> Result<Claims, AuthError>;

    /// The account behind a validated token.
    async fn current_user(&self, claims: &Claims) -> Result<UserDto, AuthError>;
}
