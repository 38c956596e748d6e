use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::entities::users::Role;
use crate::models::CreateUser;
use crate::services::{
    AuthService, CategoryService, Credentials, EventService, RegistrationService,
    SeaOrmAuthService, SeaOrmCategoryService, SeaOrmEventService, SeaOrmRegistrationService,
    SeaOrmStatsService, SeaOrmUserService, StatsService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub credentials: Arc<Credentials>,

    pub auth_service: Arc<dyn AuthService>,

    pub category_service: Arc<dyn CategoryService>,

    pub event_service: Arc<dyn EventService>,

    pub user_service: Arc<dyn UserService>,

    pub registration_service: Arc<dyn RegistrationService>,

    pub stats_service: Arc<dyn StatsService>,
}

impl SharedState {
    /// Connects the store, runs migrations and wires the services.
    ///
    /// The config must already carry a signing secret (see [`Config::ensure_jwt_secret`]).
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let credentials = Arc::new(Credentials::new(&config.security)?);

        let state = Self {
            auth_service: Arc::new(SeaOrmAuthService::new(store.clone(), credentials.clone())),
            category_service: Arc::new(SeaOrmCategoryService::new(store.clone())),
            event_service: Arc::new(SeaOrmEventService::new(store.clone())),
            user_service: Arc::new(SeaOrmUserService::new(store.clone(), credentials.clone())),
            registration_service: Arc::new(SeaOrmRegistrationService::new(store.clone())),
            stats_service: Arc::new(SeaOrmStatsService::new(store.clone())),
            config: Arc::new(config),
            store,
            credentials,
        };

        state.bootstrap_admin().await?;

        Ok(state)
    }

    /// Creates the configured administrator if no account uses its email yet.
    async fn bootstrap_admin(&self) -> anyhow::Result<()> {
        let admin = &self.config.security.bootstrap_admin;
        if !admin.enabled {
            return Ok(());
        }

        let email = admin.email.trim().to_lowercase();
        if self.store.get_user_by_email(&email).await?.is_some() {
            return Ok(());
        }

        let user = self
            .user_service
            .create(CreateUser {
                name: admin.name.clone(),
                email,
                password: admin.password.clone(),
                role: Some(Role::Administrator),
            })
            .await?;

        info!("Bootstrap administrator created: {}", user.email);
        Ok(())
    }
}
