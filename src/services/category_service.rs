//! Domain service for event categories.

use thiserror::Error;

use crate::entities::categories;
use crate::models::{CreateCategory, FieldError, UpdateCategory};

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category {0} not found")]
    NotFound(i32),

    #[error("A category named '{0}' already exists")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CategoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CategoryError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            return Self::Conflict("name".to_string());
        }
        Self::Internal(format!("{err:#}"))
    }
}

impl From<FieldError> for CategoryError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.0)
    }
}

#[async_trait::async_trait]
pub trait CategoryService: Send + Sync {
    /// All categories, ordered by name.
    async fn list(&self) -> Result<Vec<categories::Model>, CategoryError>;

    async fn get(&self, id: i32) -> Result<categories::Model, CategoryError>;

    /// Case-insensitive substring match on name and description.
    async fn search(&self, query: &str) -> Result<Vec<categories::Model>, CategoryError>;

    /// # Errors
    ///
    /// Returns [`CategoryError::Conflict`] if the name is taken.
    async fn create(&self, input: CreateCategory) -> Result<categories::Model, CategoryError>;

    async fn update(
        &self,
        id: i32,
        input: UpdateCategory,
    ) -> Result<categories::Model, CategoryError>;

    /// Deletes the category, its events and their registrations.
    async fn delete(&self, id: i32) -> Result<(), CategoryError>;
}
