use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};

use crate::entities::{events, prelude::*, registrations};

pub struct StatsRepository {
    conn: DatabaseConnection,
}

impl StatsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn event_count(&self) -> Result<u64> {
        Events::find()
            .count(&self.conn)
            .await
            .context("Failed to count events")
    }

    /// Registrations held for events starting strictly after `today`.
    pub async fn upcoming_registration_count(&self, today: NaiveDate) -> Result<u64> {
        Registrations::find()
            .join(JoinType::InnerJoin, registrations::Relation::Event.def())
            .filter(events::Column::StartDate.gt(today))
            .count(&self.conn)
            .await
            .context("Failed to count upcoming registrations")
    }

    /// Number of registrations for each event that has at least one.
    pub async fn registrations_per_event(&self) -> Result<Vec<i64>> {
        let rows: Vec<(i32, i64)> = Registrations::find()
            .select_only()
            .column(registrations::Column::EventId)
            .column_as(Expr::col(registrations::Column::Id).count(), "registration_count")
            .group_by(registrations::Column::EventId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group registrations by event")?;

        Ok(rows.into_iter().map(|(_, count)| count).collect())
    }

    /// Name and registration count of the most subscribed event, oldest id first on ties.
    pub async fn top_event(&self) -> Result<Option<(String, i64)>> {
        Events::find()
            .select_only()
            .column(events::Column::Name)
            .column_as(
                Expr::col((Registrations, registrations::Column::Id)).count(),
                "registration_count",
            )
            .join(JoinType::LeftJoin, events::Relation::Registrations.def())
            .group_by(events::Column::Id)
            .group_by(events::Column::Name)
            .order_by_desc(Expr::cust("registration_count"))
            .order_by_asc(events::Column::Id)
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to find top event")
    }
}
