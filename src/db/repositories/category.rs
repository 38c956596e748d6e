use anyhow::{Context, Result};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use super::contains_ci;
use crate::entities::{categories, events, prelude::*, registrations};

/// Fields to change on a category. `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl CategoryChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<categories::Model>> {
        Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    pub async fn get(&self, id: i32) -> Result<Option<categories::Model>> {
        Categories::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query category by ID")
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<categories::Model>> {
        Categories::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query category by name")
    }

    pub async fn search(&self, query: &str) -> Result<Vec<categories::Model>> {
        Categories::find()
            .filter(
                Condition::any()
                    .add(contains_ci(categories::Column::Name, query))
                    .add(contains_ci(categories::Column::Description, query)),
            )
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to search categories")
    }

    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<categories::Model> {
        let model = categories::ActiveModel {
            name: Set(name),
            description: Set(description),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert category")?;

        info!("Created category #{} ({})", model.id, model.name);
        Ok(model)
    }

    pub async fn update(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> Result<Option<categories::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let mut active: categories::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update category")?;

        Ok(Some(model))
    }

    /// Deletes a category together with its events and their registrations.
    ///
    /// Returns `false` when no category has the given id.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let event_ids = Query::select()
            .column(events::Column::Id)
            .from(Events)
            .and_where(events::Column::CategoryId.eq(id))
            .to_owned();

        let removed_registrations = Registrations::delete_many()
            .filter(registrations::Column::EventId.in_subquery(event_ids))
            .exec(&txn)
            .await
            .context("Failed to delete registrations of category events")?;

        let removed_events = Events::delete_many()
            .filter(events::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete category events")?;

        let removed = Categories::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete category")?;

        if removed.rows_affected == 0 {
            // Nothing was deleted; dropping the transaction rolls back.
            return Ok(false);
        }

        txn.commit().await?;

        info!(
            "Deleted category #{id} with {} events and {} registrations",
            removed_events.rows_affected, removed_registrations.rows_affected
        );
        Ok(true)
    }
}
