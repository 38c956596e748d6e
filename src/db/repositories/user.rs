use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{prelude::*, registrations, users};

/// Columns needed to insert a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: users::Role,
}

#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<users::Role>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    /// Email lookup. Callers pass the normalized (lowercase) address.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn list(&self, skip: u64, limit: u64) -> Result<Vec<users::Model>> {
        Users::find()
            .order_by_asc(users::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list users")
    }

    pub async fn list_by_role(
        &self,
        role: users::Role,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<users::Model>> {
        Users::find()
            .filter(users::Column::Role.eq(role))
            .order_by_asc(users::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list users by role")
    }

    pub async fn count(&self) -> Result<u64> {
        Users::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn count_by_role(&self, role: users::Role) -> Result<u64> {
        Users::find()
            .filter(users::Column::Role.eq(role))
            .count(&self.conn)
            .await
            .context("Failed to count users by role")
    }

    pub async fn create(&self, user: NewUser) -> Result<users::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = users::ActiveModel {
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert user")?;

        info!("Created user #{} with role {}", model.id, model.role);
        Ok(model)
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<users::Model>> {
        let Some(user) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(model))
    }

    /// Deletes a user and every registration they hold.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Registrations::delete_many()
            .filter(registrations::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete user registrations")?;

        let removed = Users::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        if removed.rows_affected == 0 {
            return Ok(false);
        }

        txn.commit().await?;
        info!("Deleted user #{id}");
        Ok(true)
    }
}
