//! Domain service for event registrations.
//!
//! Admission is capacity-checked atomically by the store; this layer adds the
//! ownership rules: clients act on their own registrations only.

use thiserror::Error;

use crate::entities::registrations;
use crate::models::{CreateRegistration, RegistrationFilter};
use crate::services::credentials::Claims;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Registration {0} not found")]
    NotFound(i32),

    #[error("Event {0} not found")]
    EventNotFound(i32),

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i32, user_id: i32 },

    #[error("Event {0} has no free slots left")]
    CapacityExceeded(i32),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RegistrationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RegistrationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait RegistrationService: Send + Sync {
    /// Registrations visible to the caller.
    async fn list(
        &self,
        caller: &Claims,
        filter: RegistrationFilter,
    ) -> Result<Vec<registrations::Model>, RegistrationError>;

    async fn get(
        &self,
        caller: &Claims,
        id: i32,
    ) -> Result<registrations::Model, RegistrationError>;

    /// Registers the caller (or, for administrators, any user) for an event.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::CapacityExceeded`] when the event is full.
    async fn register(
        &self,
        caller: &Claims,
        input: CreateRegistration,
    ) -> Result<registrations::Model, RegistrationError>;

    async fn cancel(&self, caller: &Claims, id: i32) -> Result<(), RegistrationError>;
}
