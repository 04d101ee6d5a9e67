//! Staff account handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserCreate};
use uuid::Uuid;

use crate::api::ScopeQuery;
use crate::auth::Identity;
use crate::db::users;
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Vec<User>> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    Ok(Json(users::list_by_restaurant(&state.pool, restaurant_id).await?))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<User>), ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let user = super::create_staff(&state, restaurant_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /api/v1/users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Query(scope): Query<ScopeQuery>,
) -> Result<StatusCode, ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    if identity.user_id() == Some(id) {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf).into());
    }
    if !users::delete(&state.pool, restaurant_id, id).await? {
        return Err(AppError::new(ErrorCode::UserNotFound)
            .with_detail("id", id.to_string())
            .into());
    }
    tracing::info!(user_id = %id, "Staff account deleted");
    Ok(StatusCode::NO_CONTENT)
}
