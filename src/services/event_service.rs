//! Domain service for events and their capacity.

use thiserror::Error;

use crate::entities::events;
use crate::models::{CreateEvent, EventFilter, EventSlots, FieldError, UpdateEvent};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event {0} not found")]
    NotFound(i32),

    #[error("Category {0} not found")]
    CategoryNotFound(String),

    #[error("Capacity {capacity} is below the {registered} registrations already held")]
    CapacityBelowRegistrations { capacity: i32, registered: u64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EventError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EventError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<FieldError> for EventError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.0)
    }
}

#[async_trait::async_trait]
pub trait EventService: Send + Sync {
    /// Events ordered by start date.
    async fn list(&self, filter: EventFilter) -> Result<Vec<events::Model>, EventError>;

    async fn get(&self, id: i32) -> Result<events::Model, EventError>;

    async fn search(&self, query: &str) -> Result<Vec<events::Model>, EventError>;

    /// # Errors
    ///
    /// Returns [`EventError::CategoryNotFound`] when the referenced category does not exist.
    async fn create(&self, input: CreateEvent) -> Result<events::Model, EventError>;

    /// # Errors
    ///
    /// Returns [`EventError::CapacityBelowRegistrations`] when the new capacity
    /// would not fit the registrations the event already holds.
    async fn update(&self, id: i32, input: UpdateEvent) -> Result<events::Model, EventError>;

    /// Deletes the event and its registrations.
    async fn delete(&self, id: i32) -> Result<(), EventError>;

    async fn remaining_slots(&self, id: i32) -> Result<EventSlots, EventError>;
}
