//! Menu products

use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::PgPool;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use super::categories;
use crate::error::ServiceResult;

/// All products, or only the orderable ones for the public menu
pub async fn list(
    pool: &PgPool,
    restaurant_id: Uuid,
    available_only: bool,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM products
        WHERE restaurant_id = $1 AND (NOT $2 OR is_available)
        ORDER BY category_id, name
        "#,
    )
    .bind(restaurant_id)
    .bind(available_only)
    .fetch_all(pool)
    .await
}

/// Products of one restaurant by id (missing ids are simply absent)
pub async fn find_many<'e, E>(
    executor: E,
    restaurant_id: Uuid,
    ids: &[i64],
) -> Result<Vec<Product>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as("SELECT * FROM products WHERE restaurant_id = $1 AND id = ANY($2)")
        .bind(restaurant_id)
        .bind(ids)
        .fetch_all(executor)
        .await
}

async fn ensure_category(pool: &PgPool, restaurant_id: Uuid, category_id: i64) -> ServiceResult<()> {
    if categories::find(pool, restaurant_id, category_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::CategoryNotFound)
            .with_detail("categoryId", category_id)
            .into());
    }
    Ok(())
}

/// Create a product in one of the restaurant's own categories
pub async fn create(
    pool: &PgPool,
    restaurant_id: Uuid,
    data: &ProductCreate,
) -> ServiceResult<Product> {
    ensure_category(pool, restaurant_id, data.category_id).await?;

    let product = sqlx::query_as(
        r#"
        INSERT INTO products (id, restaurant_id, category_id, name, description, price, is_available, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.price)
    .bind(data.is_available.unwrap_or(true))
    .bind(&data.image_url)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: i64,
    data: &ProductUpdate,
) -> ServiceResult<Product> {
    if let Some(category_id) = data.category_id {
        ensure_category(pool, restaurant_id, category_id).await?;
    }

    let product: Option<Product> = sqlx::query_as(
        r#"
        UPDATE products SET
            category_id = COALESCE($3, category_id),
            name = COALESCE($4, name),
            description = COALESCE($5, description),
            price = COALESCE($6, price),
            is_available = COALESCE($7, is_available),
            image_url = COALESCE($8, image_url)
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.category_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(data.price)
    .bind(data.is_available)
    .bind(&data.image_url)
    .fetch_optional(pool)
    .await?;

    product.ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).into())
}

pub async fn set_availability(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: i64,
    is_available: bool,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE products SET is_available = $3 WHERE id = $1 AND restaurant_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(is_available)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, restaurant_id: Uuid, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
