//! `SeaORM` implementation of the `CategoryService` trait.

use async_trait::async_trait;

use crate::db::{CategoryChanges, Store};
use crate::entities::categories;
use crate::models::{CreateCategory, UpdateCategory, check_title};
use crate::services::category_service::{CategoryError, CategoryService};

pub struct SeaOrmCategoryService {
    store: Store,
}

impl SeaOrmCategoryService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_name_free(&self, name: &str, except: Option<i32>) -> Result<(), CategoryError> {
        if let Some(existing) = self.store.get_category_by_name(name).await?
            && Some(existing.id) != except
        {
            return Err(CategoryError::Conflict(name.to_string()));
        }
        Ok(())
    }
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[async_trait]
impl CategoryService for SeaOrmCategoryService {
    async fn list(&self) -> Result<Vec<categories::Model>, CategoryError> {
        Ok(self.store.list_categories().await?)
    }

    async fn get(&self, id: i32) -> Result<categories::Model, CategoryError> {
        self.store
            .get_category(id)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    async fn search(&self, query: &str) -> Result<Vec<categories::Model>, CategoryError> {
        Ok(self.store.search_categories(query).await?)
    }

    async fn create(&self, input: CreateCategory) -> Result<categories::Model, CategoryError> {
        let name = check_title("Category name", &input.name)?;
        self.ensure_name_free(&name, None).await?;

        let category = self
            .store
            .create_category(name.clone(), clean_description(input.description))
            .await
            .map_err(|e| match CategoryError::from(e) {
                CategoryError::Conflict(_) => CategoryError::Conflict(name),
                other => other,
            })?;

        Ok(category)
    }

    async fn update(
        &self,
        id: i32,
        input: UpdateCategory,
    ) -> Result<categories::Model, CategoryError> {
        let name = input
            .name
            .as_deref()
            .map(|n| check_title("Category name", n))
            .transpose()?;

        if let Some(name) = &name {
            self.ensure_name_free(name, Some(id)).await?;
        }

        let changes = CategoryChanges {
            name,
            description: input.description.map(clean_description),
        };

        self.store
            .update_category(id, changes)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> Result<(), CategoryError> {
        if self.store.delete_category(id).await? {
            Ok(())
        } else {
            Err(CategoryError::NotFound(id))
        }
    }
}
