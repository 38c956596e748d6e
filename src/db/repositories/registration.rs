use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Statement,
};
use tracing::{debug, info};

use crate::entities::{prelude::*, registrations};

/// Inserts the registration only while the event is below capacity.
///
/// The count and the insert are evaluated by a single statement, so concurrent
/// admissions for the same event can never overshoot the capacity.
const ADMIT_SQL: &str = r"
INSERT INTO registrations (event_id, user_id, registered_on)
SELECT events.id, ?, ?
FROM events
WHERE events.id = ?
  AND (SELECT COUNT(*) FROM registrations WHERE registrations.event_id = events.id) < events.capacity
";

/// Result of an admission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted(registrations::Model),
    EventNotFound,
    UserNotFound,
    AlreadyRegistered,
    Full,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationListFilter {
    pub event_id: Option<i32>,
    pub user_id: Option<i32>,
}

pub struct RegistrationRepository {
    conn: DatabaseConnection,
}

impl RegistrationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn admit(
        &self,
        event_id: i32,
        user_id: i32,
        registered_on: NaiveDate,
    ) -> Result<Admission> {
        if Events::find_by_id(event_id).one(&self.conn).await?.is_none() {
            return Ok(Admission::EventNotFound);
        }
        if Users::find_by_id(user_id).one(&self.conn).await?.is_none() {
            return Ok(Admission::UserNotFound);
        }
        if self.find(event_id, user_id).await?.is_some() {
            return Ok(Admission::AlreadyRegistered);
        }

        let backend = self.conn.get_database_backend();
        let result = self
            .conn
            .execute(Statement::from_sql_and_values(
                backend,
                ADMIT_SQL,
                [user_id.into(), registered_on.into(), event_id.into()],
            ))
            .await
            .context("Failed to insert registration")?;

        if result.rows_affected() == 0 {
            // The event may have been deleted between the lookup and the insert.
            if Events::find_by_id(event_id).one(&self.conn).await?.is_none() {
                return Ok(Admission::EventNotFound);
            }
            debug!("Event #{event_id} is full, rejected user #{user_id}");
            return Ok(Admission::Full);
        }

        let registration = self
            .find(event_id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Inserted registration could not be read back"))?;

        info!(
            "Registered user #{user_id} for event #{event_id} (registration #{})",
            registration.id
        );
        Ok(Admission::Admitted(registration))
    }

    async fn find(&self, event_id: i32, user_id: i32) -> Result<Option<registrations::Model>> {
        Registrations::find()
            .filter(registrations::Column::EventId.eq(event_id))
            .filter(registrations::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query registration")
    }

    pub async fn get(&self, id: i32) -> Result<Option<registrations::Model>> {
        Registrations::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query registration by ID")
    }

    pub async fn list(&self, filter: RegistrationListFilter) -> Result<Vec<registrations::Model>> {
        let mut query = Registrations::find();

        if let Some(event_id) = filter.event_id {
            query = query.filter(registrations::Column::EventId.eq(event_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(registrations::Column::UserId.eq(user_id));
        }

        query
            .order_by_asc(registrations::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list registrations")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let removed = Registrations::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete registration")?;

        Ok(removed.rows_affected > 0)
    }
}
