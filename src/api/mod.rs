use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod categories;
mod error;
mod events;
pub mod extract;
mod observability;
mod registrations;
mod stats;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::{
    AuthService, CategoryService, EventService, RegistrationService, StatsService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn category_service(&self) -> &Arc<dyn CategoryService> {
        &self.shared.category_service
    }

    #[must_use]
    pub fn event_service(&self) -> &Arc<dyn EventService> {
        &self.shared.event_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn registration_service(&self) -> &Arc<dyn RegistrationService> {
        &self.shared.registration_service
    }

    #[must_use]
    pub fn stats_service(&self) -> &Arc<dyn StatsService> {
        &self.shared.stats_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;
    let cors_origins = server.cors_allowed_origins.clone();
    let timeout = Duration::from_secs(server.request_timeout_seconds);
    let frontend_dir = server.frontend_dir.clone();

    let public_routes = Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/usuarios", post(users::create_user));

    let app_routes = Router::new()
        .merge(public_routes)
        .merge(create_protected_router(state.clone()))
        .merge(create_admin_router(state.clone()))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let app = match frontend_dir {
        Some(dir) if Path::new(&dir).is_dir() => {
            let index = Path::new(&dir).join("index.html");
            app_routes.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index)))
        }
        _ => app_routes,
    };

    app.layer(middleware::from_fn(observability::logging_middleware))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
}

/// Routes open to any authenticated user.
fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/categorias", get(categories::list_categories))
        .route("/categorias/buscar", get(categories::search_categories))
        .route("/categorias/{id}", get(categories::get_category))
        .route("/eventos", get(events::list_events))
        .route("/eventos/buscar", get(events::search_events))
        .route("/eventos/{id}", get(events::get_event))
        .route("/eventos/{id}/cupos", get(events::get_event_slots))
        .route("/inscripciones", get(registrations::list_registrations))
        .route("/inscripciones", post(registrations::create_registration))
        .route("/inscripciones/{id}", get(registrations::get_registration))
        .route("/inscripciones/{id}", delete(registrations::delete_registration))
        .route("/usuarios/{id}", get(users::get_user))
        .route("/usuarios/{id}", put(users::update_user))
        .route("/stats/dashboard", get(stats::dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth))
}

/// Routes reserved to administrators.
fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/categorias", post(categories::create_category))
        .route("/categorias/{id}", put(categories::update_category))
        .route("/categorias/{id}", delete(categories::delete_category))
        .route("/eventos", post(events::create_event))
        .route("/eventos/{id}", put(events::update_event))
        .route("/eventos/{id}", delete(events::delete_event))
        .route("/usuarios", get(users::list_users))
        .route("/usuarios/buscar", get(users::find_user_by_email))
        .route("/usuarios/rol/{rol}", get(users::list_users_by_role))
        .route("/usuarios/stats/count", get(users::count_users))
        .route("/usuarios/{id}", delete(users::delete_user))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth))
}
