//! `SeaORM` implementation of the `EventService` trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::{EventChanges, EventListFilter, EventUpdate, NewEvent, Store};
use crate::entities::events;
use crate::models::{CreateEvent, EventFilter, EventSlots, UpdateEvent, check_title};
use crate::services::event_service::{EventError, EventService};

pub struct SeaOrmEventService {
    store: Store,
}

impl SeaOrmEventService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn resolve_category(
        &self,
        category_id: Option<i32>,
        category_name: Option<&str>,
    ) -> Result<Option<i32>, EventError> {
        match (category_id, category_name) {
            (Some(_), Some(_)) => Err(EventError::Validation(
                "Provide either category_id or category, not both".to_string(),
            )),
            (Some(id), None) => {
                self.store
                    .get_category(id)
                    .await?
                    .ok_or_else(|| EventError::CategoryNotFound(id.to_string()))?;
                Ok(Some(id))
            }
            (None, Some(name)) => {
                let name = name.trim();
                let category = self
                    .store
                    .get_category_by_name(name)
                    .await?
                    .ok_or_else(|| EventError::CategoryNotFound(format!("'{name}'")))?;
                Ok(Some(category.id))
            }
            (None, None) => Ok(None),
        }
    }
}

fn check_schedule(start: NaiveDate, end: NaiveDate) -> Result<(), EventError> {
    if end < start {
        return Err(EventError::Validation(
            "end_date cannot be earlier than start_date".to_string(),
        ));
    }
    Ok(())
}

fn check_capacity(capacity: i32) -> Result<(), EventError> {
    if capacity < 0 {
        return Err(EventError::Validation(
            "capacity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl EventService for SeaOrmEventService {
    async fn list(&self, filter: EventFilter) -> Result<Vec<events::Model>, EventError> {
        let today = chrono::Utc::now().date_naive();

        let query = EventListFilter {
            category_id: filter.category_id,
            starts_after: filter.available.then_some(today),
            with_free_slots: filter.available,
            skip: filter.skip,
            limit: filter.limit,
        };

        Ok(self.store.list_events(&query).await?)
    }

    async fn get(&self, id: i32) -> Result<events::Model, EventError> {
        self.store
            .get_event(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    async fn search(&self, query: &str) -> Result<Vec<events::Model>, EventError> {
        Ok(self.store.search_events(query).await?)
    }

    async fn create(&self, input: CreateEvent) -> Result<events::Model, EventError> {
        let name = check_title("Event name", &input.name)?;
        let venue = check_title("Venue", &input.venue)?;
        check_capacity(input.capacity)?;
        check_schedule(input.start_date, input.end_date)?;

        let category_id = self
            .resolve_category(input.category_id, input.category.as_deref())
            .await?;

        let event = self
            .store
            .create_event(NewEvent {
                name,
                description: input.description.trim().to_string(),
                start_date: input.start_date,
                end_date: input.end_date,
                venue,
                capacity: input.capacity,
                category_id,
            })
            .await?;

        Ok(event)
    }

    async fn update(&self, id: i32, input: UpdateEvent) -> Result<events::Model, EventError> {
        let existing = self.get(id).await?;

        let name = input
            .name
            .as_deref()
            .map(|n| check_title("Event name", n))
            .transpose()?;
        let venue = input
            .venue
            .as_deref()
            .map(|v| check_title("Venue", v))
            .transpose()?;

        let input_capacity = input.capacity;
        if let Some(capacity) = input_capacity {
            check_capacity(capacity)?;
        }

        check_schedule(
            input.start_date.unwrap_or(existing.start_date),
            input.end_date.unwrap_or(existing.end_date),
        )?;

        if let Some(Some(category_id)) = input.category_id {
            self.resolve_category(Some(category_id), None).await?;
        }

        let changes = EventChanges {
            name,
            description: input.description.map(|d| d.trim().to_string()),
            start_date: input.start_date,
            end_date: input.end_date,
            venue,
            capacity: input.capacity,
            category_id: input.category_id,
        };

        match self.store.update_event(id, changes).await? {
            EventUpdate::Updated(event) => Ok(event),
            EventUpdate::NotFound => Err(EventError::NotFound(id)),
            EventUpdate::CapacityBelowRegistrations { registered } => {
                Err(EventError::CapacityBelowRegistrations {
                    capacity: input_capacity.unwrap_or_default(),
                    registered,
                })
            }
        }
    }

    async fn delete(&self, id: i32) -> Result<(), EventError> {
        if self.store.delete_event(id).await? {
            Ok(())
        } else {
            Err(EventError::NotFound(id))
        }
    }

    async fn remaining_slots(&self, id: i32) -> Result<EventSlots, EventError> {
        let event = self.get(id).await?;
        let registered = self.store.event_registration_count(id).await?;
        let capacity = u64::try_from(event.capacity).unwrap_or(0);

        Ok(EventSlots {
            capacity: event.capacity,
            registered,
            remaining: capacity.saturating_sub(registered),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_allows_single_day_events() {
        let day = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();
        assert!(check_schedule(day, day).is_ok());
        assert!(check_schedule(day, day.pred_opt().unwrap()).is_err());
    }

    #[test]
    fn capacity_must_not_be_negative() {
        assert!(check_capacity(0).is_ok());
        assert!(check_capacity(-1).is_err());
    }
}
