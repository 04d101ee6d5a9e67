//! Dining tables

use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, DiningTableUpdate, table_id};
use sqlx::PgPool;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::error::{ServiceResult, unique_or};

pub async fn list(pool: &PgPool, restaurant_id: Uuid) -> Result<Vec<DiningTable>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM dining_tables WHERE restaurant_id = $1 ORDER BY table_number")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
}

pub async fn find_by_number<'e, E>(
    executor: E,
    restaurant_id: Uuid,
    table_number: i32,
) -> Result<Option<DiningTable>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as("SELECT * FROM dining_tables WHERE restaurant_id = $1 AND table_number = $2")
        .bind(restaurant_id)
        .bind(table_number)
        .fetch_optional(executor)
        .await
}

/// Create a table with the deterministic `<restaurant>-T<nnn>` id
///
/// The pre-check gives a clean conflict for the common case; the unique
/// constraint settles concurrent creates.
pub async fn create(
    pool: &PgPool,
    restaurant_id: Uuid,
    table_number: i32,
    now: i64,
) -> ServiceResult<DiningTable> {
    if table_number <= 0 {
        return Err(AppError::new(ErrorCode::TableNumberInvalid)
            .with_detail("tableNumber", table_number)
            .into());
    }

    if find_by_number(pool, restaurant_id, table_number).await?.is_some() {
        return Err(AppError::new(ErrorCode::TableNumberExists)
            .with_detail("tableNumber", table_number)
            .into());
    }

    let table = sqlx::query_as(
        r#"
        INSERT INTO dining_tables (id, restaurant_id, table_number, is_active, created_at)
        VALUES ($1, $2, $3, TRUE, $4)
        RETURNING *
        "#,
    )
    .bind(table_id(&restaurant_id, table_number))
    .bind(restaurant_id)
    .bind(table_number)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| unique_or(e, ErrorCode::TableNumberExists))?;
    Ok(table)
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: &str,
    data: &DiningTableUpdate,
) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE dining_tables SET is_active = COALESCE($3, is_active)
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}

/// Delete a table that has no open orders
pub async fn delete(pool: &PgPool, restaurant_id: Uuid, id: &str) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    // Row lock keeps a concurrent order from attaching between check and delete
    let table: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM dining_tables WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(&mut *tx)
    .await?;
    if table.is_none() {
        return Err(AppError::new(ErrorCode::TableNotFound).with_detail("id", id).into());
    }

    let open = super::orders::count_open_for_table(&mut *tx, id).await?;
    if open > 0 {
        return Err(AppError::new(ErrorCode::TableHasOrders)
            .with_detail("openOrders", open)
            .into());
    }

    sqlx::query("DELETE FROM dining_tables WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
