//! Menu handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AvailabilityUpdate, Category, CategoryCreate, CategoryUpdate, Product, ProductCreate,
    ProductUpdate, PublicMenu, PublicRestaurant, Restaurant, RestaurantProfileUpdate,
    group_categories,
};

use crate::api::ScopeQuery;
use crate::auth::Identity;
use crate::db::{categories, products, restaurants};
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;

fn require_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "name is required"));
    }
    Ok(())
}

fn product_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ProductNotFound).with_detail("id", id)
}

/// GET /api/v1/menu/public/:slug
///
/// Active restaurants only; unavailable products are left out.
pub async fn public_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<PublicMenu> {
    let restaurant = restaurants::find_active_by_slug(&state.pool, &slug).await?;
    let categories = categories::list(&state.pool, restaurant.id).await?;
    let products = products::list(&state.pool, restaurant.id, true).await?;

    Ok(Json(PublicMenu {
        restaurant: PublicRestaurant::from(&restaurant),
        groups: group_categories(categories),
        products,
    }))
}

// ── Categories ──

/// GET /api/v1/menu/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Vec<Category>> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    Ok(Json(categories::list(&state.pool, restaurant_id).await?))
}

/// POST /api/v1/menu/categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    require_name(&payload.name)?;
    let category = categories::create(&state.pool, restaurant_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PATCH /api/v1/menu/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    if let Some(name) = &payload.name {
        require_name(name)?;
    }
    let category = categories::update(&state.pool, restaurant_id, id, &payload)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound).with_detail("id", id))?;
    Ok(Json(category))
}

/// DELETE /api/v1/menu/categories/:id
///
/// 409 while the category still has products.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(scope): Query<ScopeQuery>,
) -> Result<StatusCode, ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    categories::delete(&state.pool, restaurant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Products ──

/// GET /api/v1/menu/products
pub async fn list_products(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Vec<Product>> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    Ok(Json(products::list(&state.pool, restaurant_id, false).await?))
}

/// POST /api/v1/menu/products
pub async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    require_name(&payload.name)?;
    shared::money::validate_price(payload.price)?;

    let product = products::create(&state.pool, restaurant_id, &payload).await?;
    tracing::info!(product_id = product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /api/v1/menu/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<ProductUpdate>,
) -> ApiResult<Product> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    if let Some(name) = &payload.name {
        require_name(name)?;
    }
    if let Some(price) = payload.price {
        shared::money::validate_price(price)?;
    }
    Ok(Json(products::update(&state.pool, restaurant_id, id, &payload).await?))
}

/// PATCH /api/v1/menu/products/:id/availability
pub async fn set_availability(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<AvailabilityUpdate>,
) -> ApiResult<Product> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let product = products::set_availability(&state.pool, restaurant_id, id, payload.is_available)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(Json(product))
}

/// DELETE /api/v1/menu/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(scope): Query<ScopeQuery>,
) -> Result<StatusCode, ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    if !products::delete(&state.pool, restaurant_id, id).await? {
        return Err(product_not_found(id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Restaurant profile ──

/// GET /api/v1/menu/restaurant
pub async fn get_restaurant(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Restaurant> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let restaurant = restaurants::find_by_id(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    Ok(Json(restaurant))
}

/// PATCH /api/v1/menu/restaurant
pub async fn update_restaurant(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<RestaurantProfileUpdate>,
) -> ApiResult<Restaurant> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let restaurant = restaurants::update_profile(&state.pool, restaurant_id, &payload)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    Ok(Json(restaurant))
}
