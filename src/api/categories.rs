use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::validation::{validate_id, validate_search_query};
use super::{ApiError, ApiResponse, AppState, SearchQuery};
use crate::entities::categories;
use crate::models::{CreateCategory, UpdateCategory};
use crate::services::CategoryError;

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(_) => Self::NotFound(err.to_string()),
            CategoryError::Conflict(_) => Self::Conflict(err.to_string()),
            CategoryError::Validation(msg) => Self::validation(msg),
            CategoryError::Database(msg) => Self::DatabaseError(msg),
            CategoryError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /categorias
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<categories::Model>>>, ApiError> {
    let categories = state.category_service().list().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// GET /categorias/buscar?q=
pub async fn search_categories(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<categories::Model>>>, ApiError> {
    let q = validate_search_query(&query.q)?;
    let categories = state.category_service().search(q).await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// GET /categorias/{id}
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<categories::Model>>, ApiError> {
    let id = validate_id("category", id)?;
    let category = state.category_service().get(id).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// POST /categorias
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateCategory>,
) -> Result<(StatusCode, Json<ApiResponse<categories::Model>>), ApiError> {
    let category = state.category_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

/// PUT /categorias/{id}
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateCategory>,
) -> Result<Json<ApiResponse<categories::Model>>, ApiError> {
    let id = validate_id("category", id)?;
    let category = state.category_service().update(id, payload).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// DELETE /categorias/{id}
///
/// Also removes the category's events and their registrations.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("category", id)?;
    state.category_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
