//! Domain service for user accounts.

use thiserror::Error;

use crate::entities::users::Role;
use crate::models::{CreateUser, FieldError, UpdateUser, UserCounts, UserDto};
use crate::services::credentials::CredentialError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(String),

    #[error("Email '{0}' is already registered")]
    EmailTaken(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            return Self::EmailTaken("email".to_string());
        }
        Self::Internal(format!("{err:#}"))
    }
}

impl From<FieldError> for UserError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.0)
    }
}

impl From<CredentialError> for UserError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<UserDto>, UserError>;

    async fn list_by_role(
        &self,
        role: Role,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<UserDto>, UserError>;

    async fn counts(&self) -> Result<UserCounts, UserError>;

    async fn get(&self, id: i32) -> Result<UserDto, UserError>;

    /// Looks up a user by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<UserDto, UserError>;

    /// Creates an account. The role defaults to `Cliente`; callers decide who may
    /// create administrators.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::EmailTaken`] if the email is already registered.
    async fn create(&self, input: CreateUser) -> Result<UserDto, UserError>;

    /// Partial update. A supplied password is re-hashed.
    async fn update(&self, id: i32, input: UpdateUser) -> Result<UserDto, UserError>;

    /// Deletes the user and their registrations.
    async fn delete(&self, id: i32) -> Result<(), UserError>;
}
