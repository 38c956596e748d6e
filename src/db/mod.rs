use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{categories, events, registrations, users};

pub mod migrator;
pub mod repositories;

pub use repositories::category::CategoryChanges;
pub use repositories::event::{EventChanges, EventListFilter, EventUpdate, NewEvent};
pub use repositories::registration::{Admission, RegistrationListFilter};
pub use repositories::user::{NewUser, UserChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every connection to an in-memory database sees its own empty schema.
        let (max_connections, min_connections) = if db_url.contains(":memory:") {
            (1, 1)
        } else {
            ensure_database_file(db_url).await?;
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn event_repo(&self) -> repositories::event::EventRepository {
        repositories::event::EventRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn registration_repo(&self) -> repositories::registration::RegistrationRepository {
        repositories::registration::RegistrationRepository::new(self.conn.clone())
    }

    fn stats_repo(&self) -> repositories::stats::StatsRepository {
        repositories::stats::StatsRepository::new(self.conn.clone())
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        self.category_repo().list().await
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<categories::Model>> {
        self.category_repo().get(id).await
    }

    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<categories::Model>> {
        self.category_repo().get_by_name(name).await
    }

    pub async fn search_categories(&self, query: &str) -> Result<Vec<categories::Model>> {
        self.category_repo().search(query).await
    }

    pub async fn create_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<categories::Model> {
        self.category_repo().create(name, description).await
    }

    pub async fn update_category(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> Result<Option<categories::Model>> {
        self.category_repo().update(id, changes).await
    }

    pub async fn delete_category(&self, id: i32) -> Result<bool> {
        self.category_repo().delete(id).await
    }

    // Events

    pub async fn list_events(&self, filter: &EventListFilter) -> Result<Vec<events::Model>> {
        self.event_repo().list(filter).await
    }

    pub async fn get_event(&self, id: i32) -> Result<Option<events::Model>> {
        self.event_repo().get(id).await
    }

    pub async fn search_events(&self, query: &str) -> Result<Vec<events::Model>> {
        self.event_repo().search(query).await
    }

    pub async fn create_event(&self, event: NewEvent) -> Result<events::Model> {
        self.event_repo().create(event).await
    }

    pub async fn update_event(
        &self,
        id: i32,
        changes: EventChanges,
    ) -> Result<EventUpdate> {
        self.event_repo().update(id, changes).await
    }

    pub async fn delete_event(&self, id: i32) -> Result<bool> {
        self.event_repo().delete(id).await
    }

    pub async fn event_registration_count(&self, event_id: i32) -> Result<u64> {
        self.event_repo().registration_count(event_id).await
    }

    // Users

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn list_users(&self, skip: u64, limit: u64) -> Result<Vec<users::Model>> {
        self.user_repo().list(skip, limit).await
    }

    pub async fn list_users_by_role(
        &self,
        role: users::Role,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<users::Model>> {
        self.user_repo().list_by_role(role, skip, limit).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn count_users_by_role(&self, role: users::Role) -> Result<u64> {
        self.user_repo().count_by_role(role).await
    }

    pub async fn create_user(&self, user: NewUser) -> Result<users::Model> {
        self.user_repo().create(user).await
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<users::Model>> {
        self.user_repo().update(id, changes).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // Registrations

    pub async fn admit_registration(
        &self,
        event_id: i32,
        user_id: i32,
        registered_on: NaiveDate,
    ) -> Result<Admission> {
        self.registration_repo()
            .admit(event_id, user_id, registered_on)
            .await
    }

    pub async fn get_registration(&self, id: i32) -> Result<Option<registrations::Model>> {
        self.registration_repo().get(id).await
    }

    pub async fn list_registrations(
        &self,
        filter: RegistrationListFilter,
    ) -> Result<Vec<registrations::Model>> {
        self.registration_repo().list(filter).await
    }

    pub async fn delete_registration(&self, id: i32) -> Result<bool> {
        self.registration_repo().delete(id).await
    }

    // Stats

    pub async fn event_count(&self) -> Result<u64> {
        self.stats_repo().event_count().await
    }

    pub async fn upcoming_registration_count(&self, today: NaiveDate) -> Result<u64> {
        self.stats_repo().upcoming_registration_count(today).await
    }

    pub async fn registrations_per_event(&self) -> Result<Vec<i64>> {
        self.stats_repo().registrations_per_event().await
    }

    pub async fn top_event(&self) -> Result<Option<(String, i64)>> {
        self.stats_repo().top_event().await
    }
}

/// `true` when the error chain contains a UNIQUE constraint failure.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .any(|db_err| matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))))
}

async fn ensure_database_file(db_url: &str) -> Result<()> {
    let path_str = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path_str = path_str.split('?').next().unwrap_or(path_str);

    if path_str.is_empty() {
        return Ok(());
    }

    let path = Path::new(path_str);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }
    if !path.exists() {
        std::fs::File::create(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_found_through_context() {
        let err = anyhow::Error::new(DbErr::Custom("boom".into())).context("Failed to insert");
        assert!(!is_unique_violation(&err));

        let plain = anyhow::anyhow!("not a database error");
        assert!(!is_unique_violation(&plain));
    }

    #[tokio::test]
    async fn in_memory_store_runs_migrations() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.ping().await.unwrap();

        assert!(store.list_categories().await.unwrap().is_empty());
        assert_eq!(store.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn capacity_cannot_drop_below_held_registrations() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let day = NaiveDate::from_ymd_opt(2099, 3, 1).unwrap();

        let event = store
            .create_event(NewEvent {
                name: "Workshop".to_string(),
                description: "Hands-on".to_string(),
                start_date: day,
                end_date: day,
                venue: "Lab".to_string(),
                capacity: 2,
                category_id: None,
            })
            .await
            .unwrap();

        for email in ["a@example.com", "b@example.com"] {
            let user = store
                .create_user(NewUser {
                    name: "Attendee".to_string(),
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                    role: users::Role::Client,
                })
                .await
                .unwrap();
            let admission = store.admit_registration(event.id, user.id, day).await.unwrap();
            assert!(matches!(admission, Admission::Admitted(_)));
        }

        let shrink = EventChanges {
            capacity: Some(1),
            venue: Some("Small lab".to_string()),
            ..EventChanges::default()
        };
        assert_eq!(
            store.update_event(event.id, shrink).await.unwrap(),
            EventUpdate::CapacityBelowRegistrations { registered: 2 }
        );

        let unchanged = store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(unchanged.capacity, 2);
        assert_eq!(unchanged.venue, "Lab");

        let exact = EventChanges {
            capacity: Some(2),
            ..EventChanges::default()
        };
        assert!(matches!(
            store.update_event(event.id, exact).await.unwrap(),
            EventUpdate::Updated(e) if e.capacity == 2
        ));

        let missing = EventChanges {
            capacity: Some(5),
            ..EventChanges::default()
        };
        assert_eq!(
            store.update_event(9999, missing).await.unwrap(),
            EventUpdate::NotFound
        );
    }
}
