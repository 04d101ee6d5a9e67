//! CRM handlers: tenants, contracts and tenant staff

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{PlatformStats, Restaurant, RestaurantCreate, RestaurantUpdate, User, UserCreate};
use uuid::Uuid;

use crate::db::{restaurants, users};
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;

/// Created tenant plus its first admin account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRestaurant {
    pub restaurant: Restaurant,
    pub admin: User,
}

async fn ensure_restaurant(state: &AppState, id: Uuid) -> Result<(), ServiceError> {
    if restaurants::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::new(ErrorCode::RestaurantNotFound)
            .with_detail("id", id.to_string())
            .into());
    }
    Ok(())
}

/// GET /api/v1/crm/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<PlatformStats> {
    Ok(Json(restaurants::stats(&state.pool).await?))
}

/// GET /api/v1/crm/restaurants
pub async fn list_restaurants(State(state): State<AppState>) -> ApiResult<Vec<Restaurant>> {
    Ok(Json(restaurants::list(&state.pool).await?))
}

/// POST /api/v1/crm/restaurants
///
/// Creates the tenant and its admin account in one transaction.
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(payload): Json<RestaurantCreate>,
) -> Result<(StatusCode, Json<CreatedRestaurant>), ServiceError> {
    payload.validate()?;

    let hash = crate::util::hash_password(&payload.admin_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let (restaurant, admin) = restaurants::create_with_admin(
        &state.pool,
        &payload,
        &hash,
        shared::util::now_millis(),
    )
    .await?;

    tracing::info!(
        restaurant_id = %restaurant.id,
        slug = %restaurant.slug,
        admin = %admin.email,
        "Restaurant created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedRestaurant { restaurant, admin }),
    ))
}

/// PATCH /api/v1/crm/restaurants/:id
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestaurantUpdate>,
) -> ApiResult<Restaurant> {
    payload.validate()?;
    let restaurant = restaurants::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::RestaurantNotFound).with_detail("id", id.to_string())
        })?;

    tracing::info!(restaurant_id = %id, is_active = restaurant.is_active, "Restaurant updated");
    Ok(Json(restaurant))
}

/// GET /api/v1/crm/restaurants/:id/users
pub async fn list_users(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<User>> {
    ensure_restaurant(&state, id).await?;
    Ok(Json(users::list_by_restaurant(&state.pool, id).await?))
}

/// POST /api/v1/crm/restaurants/:id/users
pub async fn create_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<User>), ServiceError> {
    ensure_restaurant(&state, id).await?;
    let user = crate::api::users::create_staff(&state, id, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
