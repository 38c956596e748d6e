use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::optional_claims;
use super::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use super::validation::{validate_id, validate_page};
use super::{ApiError, ApiResponse, AppState, PageQuery};
use crate::entities::users::Role;
use crate::models::{CreateUser, UpdateUser, UserCounts, UserDto};
use crate::services::{Claims, UserError};

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::EmailTaken(_) => Self::Conflict(err.to_string()),
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: String,
}

fn ensure_self_or_admin(claims: &Claims, id: i32) -> Result<(), ApiError> {
    if claims.is_admin() || claims.sub == id {
        Ok(())
    } else {
        Err(ApiError::forbidden("You can only access your own account"))
    }
}

/// POST /usuarios
///
/// Open sign-up. Creating an administrator requires an administrator's token.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<CreateUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    if payload.role == Some(Role::Administrator) {
        let caller = optional_claims(&state, &headers).await?;
        if !caller.is_some_and(|c| c.is_admin()) {
            return Err(ApiError::forbidden(
                "Only administrators can create administrator accounts",
            ));
        }
    }

    let user = state.user_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// GET /usuarios?skip=&limit=
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let (skip, limit) = validate_page(page)?;
    let users = state.user_service().list(skip, limit).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /usuarios/buscar?email=
pub async fn find_user_by_email(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    if query.email.trim().is_empty() {
        return Err(ApiError::validation("email is required"));
    }

    let user = state.user_service().find_by_email(&query.email).await?;
    Ok(Json(ApiResponse::success(vec![user])))
}

/// GET /usuarios/rol/{rol}?skip=&limit=
pub async fn list_users_by_role(
    State(state): State<Arc<AppState>>,
    ApiPath(role): ApiPath<Role>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let (skip, limit) = validate_page(page)?;
    let users = state.user_service().list_by_role(role, skip, limit).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /usuarios/stats/count
pub async fn count_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<UserCounts>>, ApiError> {
    let counts = state.user_service().counts().await?;
    Ok(Json(ApiResponse::success(counts)))
}

/// GET /usuarios/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id("user", id)?;
    ensure_self_or_admin(&claims, id)?;

    let user = state.user_service().get(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /usuarios/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id("user", id)?;
    ensure_self_or_admin(&claims, id)?;

    if payload.role.is_some() && !claims.is_admin() {
        return Err(ApiError::forbidden("Only administrators can change roles"));
    }

    let user = state.user_service().update(id, payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// DELETE /usuarios/{id}
///
/// Also removes the user's registrations.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("user", id)?;
    state.user_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
