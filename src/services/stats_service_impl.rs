//! `SeaORM` implementation of the `StatsService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::{Dashboard, TopEvent};
use crate::services::stats_service::{StatsError, StatsService};

pub struct SeaOrmStatsService {
    store: Store,
}

impl SeaOrmStatsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Mean of the counts rounded to one decimal, 0 for an empty slice.
#[allow(clippy::cast_precision_loss)]
fn average_one_decimal(counts: &[i64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let mean = counts.iter().sum::<i64>() as f64 / counts.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[async_trait]
impl StatsService for SeaOrmStatsService {
    async fn dashboard(&self) -> Result<Dashboard, StatsError> {
        let today = chrono::Utc::now().date_naive();

        let total_events = self.store.event_count().await?;
        let active_registrations = self.store.upcoming_registration_count(today).await?;
        let per_event = self.store.registrations_per_event().await?;

        let top_event = self
            .store
            .top_event()
            .await?
            .map_or_else(TopEvent::none, |(name, registrations)| TopEvent {
                name,
                registrations,
            });

        Ok(Dashboard {
            total_events,
            active_registrations,
            average_registrations_per_event: average_one_decimal(&per_event),
            top_event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rounds_to_one_decimal() {
        assert!((average_one_decimal(&[]) - 0.0).abs() < f64::EPSILON);
        assert!((average_one_decimal(&[1, 2]) - 1.5).abs() < f64::EPSILON);
        assert!((average_one_decimal(&[1, 1, 2]) - 1.3).abs() < f64::EPSILON);
    }
}
