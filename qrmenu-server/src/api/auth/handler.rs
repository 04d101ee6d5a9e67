//! Authentication handlers

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CustomerLoginRequest, CustomerLoginResponse, IdentityInfo, LoginRequest, LoginResponse,
    PublicRestaurant, User,
};

use crate::auth::Identity;
use crate::db::{restaurants, users};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::util::verify_password;

/// Fixed delay before answering a login, so a missing account and a wrong
/// password take the same time
const AUTH_FIXED_DELAY_MS: u64 = 200;

/// POST /api/v1/auth/login
///
/// Email lookup is case-insensitive. A `restaurantId` or `restaurantSlug`
/// scopes the lookup when the same email exists in several restaurants.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, "email is required"))?;

    let scope = match (
        req.restaurant_id,
        req.restaurant_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) {
        (Some(id), _) => Some(id),
        (None, Some(slug)) => Some(
            restaurants::find_by_slug(&state.pool, slug)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::RestaurantNotFound).with_detail("slug", slug)
                })?
                .id,
        ),
        (None, None) => None,
    };

    let candidates = users::find_for_login(&state.pool, email, scope).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(row) = candidates
        .into_iter()
        .find(|u| verify_password(&req.password, &u.password_hash))
    else {
        tracing::warn!(email = %email, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials().into());
    };

    if !row.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }
    let user = User::try_from(row)?;

    if let Some(restaurant_id) = user.restaurant_id {
        let active = restaurants::find_by_id(&state.pool, restaurant_id)
            .await?
            .is_some_and(|r| r.is_active);
        if !active {
            return Err(AppError::new(ErrorCode::RestaurantInactive).into());
        }
    }

    let token = state
        .jwt
        .issue_staff(user.id, user.restaurant_id, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in successfully");

    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/v1/auth/customer-login
///
/// QR-menu entry point: no password, the token is bound to the restaurant
/// and the table number printed on the QR code.
pub async fn customer_login(
    State(state): State<AppState>,
    Json(req): Json<CustomerLoginRequest>,
) -> ApiResult<CustomerLoginResponse> {
    if req.table_number <= 0 {
        return Err(AppError::new(ErrorCode::TableNumberInvalid)
            .with_detail("tableNumber", req.table_number)
            .into());
    }

    let restaurant = restaurants::find_active_by_slug(&state.pool, &req.restaurant_slug).await?;

    let token = state
        .jwt
        .issue_customer(restaurant.id, req.table_number)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        restaurant = %restaurant.slug,
        table_number = req.table_number,
        "Customer session started"
    );

    Ok(Json(CustomerLoginResponse {
        token,
        restaurant: PublicRestaurant::from(&restaurant),
        table_number: req.table_number,
    }))
}

/// GET /api/v1/auth/me
pub async fn me(Extension(identity): Extension<Identity>) -> Json<IdentityInfo> {
    Json(identity.info())
}
