use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::contains_ci;
use crate::entities::{events, prelude::*, registrations};

/// Columns needed to insert an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub venue: String,
    pub capacity: i32,
    pub category_id: Option<i32>,
}

#[derive(Debug, Default, Clone)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub capacity: Option<i32>,
    pub category_id: Option<Option<i32>>,
}

impl EventChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.venue.is_none()
            && self.capacity.is_none()
            && self.category_id.is_none()
    }
}

/// Outcome of [`EventRepository::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventUpdate {
    Updated(events::Model),
    NotFound,
    /// The requested capacity is lower than the registrations already held.
    CapacityBelowRegistrations { registered: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct EventListFilter {
    pub category_id: Option<i32>,
    /// Only events whose start date is strictly after this date.
    pub starts_after: Option<NaiveDate>,
    /// Only events that still have at least one free slot.
    pub with_free_slots: bool,
    pub skip: u64,
    pub limit: u64,
}

const HAS_FREE_SLOTS: &str =
    "capacity > (SELECT COUNT(*) FROM registrations WHERE registrations.event_id = events.id)";

const FITS_REGISTRATIONS: &str =
    "(SELECT COUNT(*) FROM registrations WHERE registrations.event_id = events.id) <= ?";

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, filter: &EventListFilter) -> Result<Vec<events::Model>> {
        let mut query = Events::find();

        if let Some(category_id) = filter.category_id {
            query = query.filter(events::Column::CategoryId.eq(category_id));
        }
        if let Some(date) = filter.starts_after {
            query = query.filter(events::Column::StartDate.gt(date));
        }
        if filter.with_free_slots {
            query = query.filter(Expr::cust(HAS_FREE_SLOTS));
        }

        query
            .order_by_asc(events::Column::StartDate)
            .order_by_asc(events::Column::Id)
            .offset(filter.skip)
            .limit(filter.limit)
            .all(&self.conn)
            .await
            .context("Failed to list events")
    }

    pub async fn get(&self, id: i32) -> Result<Option<events::Model>> {
        Events::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query event by ID")
    }

    pub async fn search(&self, query: &str) -> Result<Vec<events::Model>> {
        Events::find()
            .filter(
                Condition::any()
                    .add(contains_ci(events::Column::Name, query))
                    .add(contains_ci(events::Column::Description, query)),
            )
            .order_by_asc(events::Column::StartDate)
            .order_by_asc(events::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to search events")
    }

    pub async fn create(&self, event: NewEvent) -> Result<events::Model> {
        let model = events::ActiveModel {
            name: Set(event.name),
            description: Set(event.description),
            start_date: Set(event.start_date),
            end_date: Set(event.end_date),
            venue: Set(event.venue),
            capacity: Set(event.capacity),
            category_id: Set(event.category_id),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert event")?;

        info!(
            "Created event #{} ({}) with capacity {}",
            model.id, model.name, model.capacity
        );
        Ok(model)
    }

    /// Applies `changes` in one `UPDATE`.
    ///
    /// A new capacity only applies while the event holds no more registrations
    /// than it allows; the count is evaluated by the statement itself, so a
    /// concurrent admission cannot slip in between check and write.
    pub async fn update(&self, id: i32, changes: EventChanges) -> Result<EventUpdate> {
        if changes.is_empty() {
            return Ok(self
                .get(id)
                .await?
                .map_or(EventUpdate::NotFound, EventUpdate::Updated));
        }

        let capacity = changes.capacity;
        let mut update = Events::update_many().filter(events::Column::Id.eq(id));

        if let Some(name) = changes.name {
            update = update.col_expr(events::Column::Name, Expr::value(name));
        }
        if let Some(description) = changes.description {
            update = update.col_expr(events::Column::Description, Expr::value(description));
        }
        if let Some(start_date) = changes.start_date {
            update = update.col_expr(events::Column::StartDate, Expr::value(start_date));
        }
        if let Some(end_date) = changes.end_date {
            update = update.col_expr(events::Column::EndDate, Expr::value(end_date));
        }
        if let Some(venue) = changes.venue {
            update = update.col_expr(events::Column::Venue, Expr::value(venue));
        }
        if let Some(capacity) = capacity {
            update = update
                .col_expr(events::Column::Capacity, Expr::value(capacity))
                .filter(Expr::cust_with_values(FITS_REGISTRATIONS, [capacity]));
        }
        if let Some(category_id) = changes.category_id {
            update = update.col_expr(events::Column::CategoryId, Expr::value(category_id));
        }

        let result = update
            .exec(&self.conn)
            .await
            .context("Failed to update event")?;

        if result.rows_affected == 0 {
            if self.get(id).await?.is_none() {
                return Ok(EventUpdate::NotFound);
            }
            let registered = self.registration_count(id).await?;
            debug!("Event #{id} keeps its capacity: {registered} registrations already held");
            return Ok(EventUpdate::CapacityBelowRegistrations { registered });
        }

        let model = self
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Updated event #{id} could not be read back"))?;

        info!("Updated event #{id}");
        Ok(EventUpdate::Updated(model))
    }

    /// Deletes an event and its registrations. Returns `false` if the event does not exist.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Registrations::delete_many()
            .filter(registrations::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete event registrations")?;

        let removed = Events::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete event")?;

        if removed.rows_affected == 0 {
            return Ok(false);
        }

        txn.commit().await?;
        info!("Deleted event #{id}");
        Ok(true)
    }

    pub async fn registration_count(&self, event_id: i32) -> Result<u64> {
        Registrations::find()
            .filter(registrations::Column::EventId.eq(event_id))
            .count(&self.conn)
            .await
            .context("Failed to count event registrations")
    }
}
