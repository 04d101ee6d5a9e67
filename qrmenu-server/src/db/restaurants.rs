//! Restaurants (tenants) and platform statistics

use shared::error::{AppError, ErrorCode};
use shared::models::{
    PlatformStats, Restaurant, RestaurantCreate, RestaurantProfileUpdate, RestaurantUpdate, Role,
    User,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::users;
use crate::error::{ServiceResult, unique_or};

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// Active restaurant by slug, or the matching tenant error
pub async fn find_active_by_slug(pool: &PgPool, slug: &str) -> ServiceResult<Restaurant> {
    let restaurant = find_by_slug(pool, slug.trim())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound).with_detail("slug", slug))?;
    if !restaurant.is_active {
        return Err(AppError::new(ErrorCode::RestaurantInactive).into());
    }
    Ok(restaurant)
}

pub async fn list(pool: &PgPool) -> Result<Vec<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

/// Create a tenant together with its admin account (single transaction)
pub async fn create_with_admin(
    pool: &PgPool,
    data: &RestaurantCreate,
    admin_password_hash: &str,
    now: i64,
) -> ServiceResult<(Restaurant, User)> {
    let mut tx = pool.begin().await?;

    let restaurant: Restaurant = sqlx::query_as(
        r#"
        INSERT INTO restaurants (
            id, name, slug, phone, address, is_active, subscription_plan,
            contract_status, contract_months, contract_start_date, monthly_fee,
            contact_name, contact_email, contact_phone, notes, created_at
        )
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(data.name.trim())
    .bind(&data.slug)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.subscription_plan.as_deref().unwrap_or("basic"))
    .bind(data.contract_status.as_deref().unwrap_or("trial"))
    .bind(data.contract_months)
    .bind(&data.contract_start_date)
    .bind(data.monthly_fee)
    .bind(&data.contact_name)
    .bind(&data.contact_email)
    .bind(&data.contact_phone)
    .bind(&data.notes)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| unique_or(e, ErrorCode::SlugTaken))?;

    let admin_name = data
        .admin_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(restaurant.name.as_str());

    let admin = users::insert(
        &mut *tx,
        users::NewUser {
            restaurant_id: Some(restaurant.id),
            email: &data.admin_email,
            password_hash: admin_password_hash,
            name: admin_name,
            role: Role::Admin,
        },
        now,
    )
    .await?;

    tx.commit().await?;
    Ok((restaurant, admin))
}

/// Operator update; absent fields keep their value
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    data: &RestaurantUpdate,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE restaurants SET
            name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            address = COALESCE($4, address),
            is_active = COALESCE($5, is_active),
            subscription_plan = COALESCE($6, subscription_plan),
            contract_status = COALESCE($7, contract_status),
            contract_months = COALESCE($8, contract_months),
            contract_start_date = COALESCE($9, contract_start_date),
            monthly_fee = COALESCE($10, monthly_fee),
            contact_name = COALESCE($11, contact_name),
            contact_email = COALESCE($12, contact_email),
            contact_phone = COALESCE($13, contact_phone),
            notes = COALESCE($14, notes)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.is_active)
    .bind(&data.subscription_plan)
    .bind(&data.contract_status)
    .bind(data.contract_months)
    .bind(&data.contract_start_date)
    .bind(data.monthly_fee)
    .bind(&data.contact_name)
    .bind(&data.contact_email)
    .bind(&data.contact_phone)
    .bind(&data.notes)
    .fetch_optional(pool)
    .await
}

/// Tenant admin update of its own public profile
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    data: &RestaurantProfileUpdate,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE restaurants SET
            name = COALESCE($2, name),
            logo_url = COALESCE($3, logo_url),
            phone = COALESCE($4, phone),
            address = COALESCE($5, address)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.name.as_deref().map(str::trim).filter(|n| !n.is_empty()))
    .bind(&data.logo_url)
    .bind(&data.phone)
    .bind(&data.address)
    .fetch_optional(pool)
    .await
}

/// Counts and recurring revenue across all tenants
pub async fn stats(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
    let (total, active, mrr): (i64, i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE is_active),
            SUM(monthly_fee) FILTER (WHERE is_active)
        FROM restaurants
        "#,
    )
    .fetch_one(pool)
    .await?;

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        "SELECT contract_status, COUNT(*) FROM restaurants GROUP BY contract_status",
    )
    .fetch_all(pool)
    .await?;

    let (total_orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;

    Ok(PlatformStats {
        total_restaurants: total,
        active_restaurants: active,
        inactive_restaurants: total - active,
        by_contract_status: by_status.into_iter().collect(),
        monthly_recurring_revenue: shared::money::to_f64(shared::money::to_decimal(
            mrr.unwrap_or(0.0),
        )),
        total_orders,
    })
}
