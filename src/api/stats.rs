use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::Dashboard;
use crate::services::StatsError;

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Database(msg) => Self::DatabaseError(msg),
            StatsError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /stats/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = state.stats_service().dashboard().await?;
    Ok(Json(ApiResponse::success(dashboard)))
}
