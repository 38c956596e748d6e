use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::validation::{DEFAULT_LIMIT, validate_id, validate_limit, validate_search_query, validate_skip};
use super::{ApiError, ApiResponse, AppState, SearchQuery};
use crate::entities::events;
use crate::models::{CreateEvent, EventFilter, EventSlots, UpdateEvent};
use crate::services::EventError;

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound(_) | EventError::CategoryNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            EventError::CapacityBelowRegistrations { .. } => Self::Conflict(err.to_string()),
            EventError::Validation(msg) => Self::validation(msg),
            EventError::Database(msg) => Self::DatabaseError(msg),
            EventError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /eventos?available=&category_id=&skip=&limit=
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<EventListQuery>,
) -> Result<Json<ApiResponse<Vec<events::Model>>>, ApiError> {
    let filter = EventFilter {
        available: query.available,
        category_id: query.category_id,
        skip: validate_skip(query.skip.unwrap_or(0))?,
        limit: validate_limit(query.limit.unwrap_or(DEFAULT_LIMIT))?,
    };

    let events = state.event_service().list(filter).await?;
    Ok(Json(ApiResponse::success(events)))
}

/// GET /eventos/buscar?q=
pub async fn search_events(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<events::Model>>>, ApiError> {
    let q = validate_search_query(&query.q)?;
    let events = state.event_service().search(q).await?;
    Ok(Json(ApiResponse::success(events)))
}

/// GET /eventos/{id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<events::Model>>, ApiError> {
    let id = validate_id("event", id)?;
    let event = state.event_service().get(id).await?;
    Ok(Json(ApiResponse::success(event)))
}

/// GET /eventos/{id}/cupos
pub async fn get_event_slots(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<EventSlots>>, ApiError> {
    let id = validate_id("event", id)?;
    let slots = state.event_service().remaining_slots(id).await?;
    Ok(Json(ApiResponse::success(slots)))
}

/// POST /eventos
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateEvent>,
) -> Result<(StatusCode, Json<ApiResponse<events::Model>>), ApiError> {
    let event = state.event_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(event))))
}

/// PUT /eventos/{id}
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateEvent>,
) -> Result<Json<ApiResponse<events::Model>>, ApiError> {
    let id = validate_id("event", id)?;
    let event = state.event_service().update(id, payload).await?;
    Ok(Json(ApiResponse::success(event)))
}

/// DELETE /eventos/{id}
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("event", id)?;
    state.event_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
