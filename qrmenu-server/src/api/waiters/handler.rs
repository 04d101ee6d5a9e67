//! Waiter API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::waiter::validate_full_name;
use shared::models::{Waiter, WaiterCreate, WaiterUpdate};

use crate::api::ScopeQuery;
use crate::auth::Identity;
use crate::db::waiters;
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::WaiterNotFound).with_detail("id", id)
}

/// GET /api/v1/waiters
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Vec<Waiter>> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    Ok(Json(waiters::list(&state.pool, restaurant_id).await?))
}

/// POST /api/v1/waiters
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<WaiterCreate>,
) -> Result<(StatusCode, Json<Waiter>), ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let full_name = validate_full_name(&payload.full_name)?;
    let phone = payload.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

    let waiter = waiters::create(
        &state.pool,
        restaurant_id,
        &full_name,
        phone,
        shared::util::now_millis(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(waiter)))
}

/// PATCH /api/v1/waiters/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<WaiterUpdate>,
) -> ApiResult<Waiter> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let full_name = payload
        .full_name
        .as_deref()
        .map(validate_full_name)
        .transpose()?;

    let waiter = waiters::update(&state.pool, restaurant_id, id, full_name.as_deref(), &payload)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(waiter))
}

/// DELETE /api/v1/waiters/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(scope): Query<ScopeQuery>,
) -> Result<StatusCode, ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    if !waiters::delete(&state.pool, restaurant_id, id).await? {
        return Err(not_found(id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
