//! Dining Table API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

use crate::api::ScopeQuery;
use crate::auth::Identity;
use crate::db::tables;
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;

/// GET /api/v1/tables
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Vec<DiningTable>> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    Ok(Json(tables::list(&state.pool, restaurant_id).await?))
}

/// POST /api/v1/tables
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<DiningTableCreate>,
) -> Result<(StatusCode, Json<DiningTable>), ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let table = tables::create(
        &state.pool,
        restaurant_id,
        payload.table_number,
        shared::util::now_millis(),
    )
    .await?;

    tracing::info!(table_id = %table.id, "Table created");
    Ok((StatusCode::CREATED, Json(table)))
}

/// PATCH /api/v1/tables/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<DiningTableUpdate>,
) -> ApiResult<DiningTable> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let table = tables::update(&state.pool, restaurant_id, &id, &payload)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).with_detail("id", id.as_str()))?;
    Ok(Json(table))
}

/// DELETE /api/v1/tables/:id
///
/// Refused with 409 while any order on the table is still open.
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Query(scope): Query<ScopeQuery>,
) -> Result<StatusCode, ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    tables::delete(&state.pool, restaurant_id, &id).await?;

    tracing::info!(table_id = %id, "Table deleted");
    Ok(StatusCode::NO_CONTENT)
}
