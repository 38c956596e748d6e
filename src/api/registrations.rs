use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::entities::registrations;
use crate::models::{CreateRegistration, RegistrationFilter};
use crate::services::RegistrationError;

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::NotFound(_)
            | RegistrationError::EventNotFound(_)
            | RegistrationError::UserNotFound(_) => Self::NotFound(err.to_string()),
            RegistrationError::AlreadyRegistered { .. } => Self::Conflict(err.to_string()),
            RegistrationError::CapacityExceeded(_) => Self::CapacityExceeded(err.to_string()),
            RegistrationError::Forbidden(msg) => Self::forbidden(msg),
            RegistrationError::Database(msg) => Self::DatabaseError(msg),
            RegistrationError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /inscripciones?event_id=&user_id=
pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiQuery(filter): ApiQuery<RegistrationFilter>,
) -> Result<Json<ApiResponse<Vec<registrations::Model>>>, ApiError> {
    let registrations = state
        .registration_service()
        .list(&claims, filter)
        .await?;
    Ok(Json(ApiResponse::success(registrations)))
}

/// GET /inscripciones/{id}
pub async fn get_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<registrations::Model>>, ApiError> {
    let id = validate_id("registration", id)?;
    let registration = state.registration_service().get(&claims, id).await?;
    Ok(Json(ApiResponse::success(registration)))
}

/// POST /inscripciones
pub async fn create_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiJson(payload): ApiJson<CreateRegistration>,
) -> Result<(StatusCode, Json<ApiResponse<registrations::Model>>), ApiError> {
    validate_id("event", payload.event_id)?;
    if let Some(user_id) = payload.user_id {
        validate_id("user", user_id)?;
    }

    let registration = state
        .registration_service()
        .register(&claims, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(registration))))
}

/// DELETE /inscripciones/{id}
pub async fn delete_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("registration", id)?;
    state.registration_service().cancel(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
