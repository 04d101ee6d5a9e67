//! Menu categories

use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ServiceResult;

pub async fn list(pool: &PgPool, restaurant_id: Uuid) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM categories WHERE restaurant_id = $1 ORDER BY sort_order, id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: i64,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: Uuid,
    data: &CategoryCreate,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO categories (id, restaurant_id, name, icon, sort_order, image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(&data.icon)
    .bind(data.sort_order.unwrap_or(0))
    .bind(&data.image_url)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: i64,
    data: &CategoryUpdate,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE categories SET
            name = COALESCE($3, name),
            icon = COALESCE($4, icon),
            sort_order = COALESCE($5, sort_order),
            image_url = COALESCE($6, image_url)
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.icon)
    .bind(data.sort_order)
    .bind(&data.image_url)
    .fetch_optional(pool)
    .await
}

/// Delete an empty category
pub async fn delete(pool: &PgPool, restaurant_id: Uuid, id: i64) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let exists: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM categories WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(&mut *tx)
    .await?;
    if exists.is_none() {
        return Err(AppError::new(ErrorCode::CategoryNotFound).into());
    }

    let (products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if products > 0 {
        return Err(AppError::new(ErrorCode::CategoryHasProducts)
            .with_detail("products", products)
            .into());
    }

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
