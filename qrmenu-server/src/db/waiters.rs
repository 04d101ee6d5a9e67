//! Waiters (staff roster, not login accounts)

use shared::models::{Waiter, WaiterUpdate};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn list(pool: &PgPool, restaurant_id: Uuid) -> Result<Vec<Waiter>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM waiters WHERE restaurant_id = $1 ORDER BY full_name")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: Uuid,
    full_name: &str,
    phone: Option<&str>,
    now: i64,
) -> Result<Waiter, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO waiters (id, restaurant_id, full_name, phone, is_active, created_at)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        RETURNING *
        "#,
    )
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(full_name)
    .bind(phone)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// `full_name` is already validated and trimmed by the caller
pub async fn update(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: i64,
    full_name: Option<&str>,
    data: &WaiterUpdate,
) -> Result<Option<Waiter>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE waiters SET
            full_name = COALESCE($3, full_name),
            phone = COALESCE($4, phone),
            is_active = COALESCE($5, is_active)
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(full_name)
    .bind(&data.phone)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, restaurant_id: Uuid, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM waiters WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
