//! Staff accounts

use shared::error::ErrorCode;
use shared::models::{Role, User};
use sqlx::PgPool;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use super::decode_enum;
use crate::error::{ServiceResult, unique_or};

/// Full user row, including the password hash
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            restaurant_id: row.restaurant_id,
            email: row.email,
            name: row.name,
            role: decode_enum(&row.role)?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, sqlx::Error> {
    rows.into_iter().map(User::try_from).collect()
}

pub struct NewUser<'a> {
    pub restaurant_id: Option<Uuid>,
    /// Normalized by the caller or here; stored lowercase
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: Role,
}

/// Insert a user; a duplicate email in the same restaurant is `UserEmailExists`
pub async fn insert<'e, E>(executor: E, new: NewUser<'_>, now: i64) -> ServiceResult<User>
where
    E: PgExecutor<'e>,
{
    let row: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, restaurant_id, email, password_hash, name, role, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.restaurant_id)
    .bind(shared::util::normalize_email(new.email))
    .bind(new.password_hash)
    .bind(new.name.trim())
    .bind(new.role.as_str())
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(|e| unique_or(e, ErrorCode::UserEmailExists))?;

    Ok(User::try_from(row)?)
}

/// Login candidates for an email, optionally scoped to one restaurant
pub async fn find_for_login(
    pool: &PgPool,
    email: &str,
    restaurant_id: Option<Uuid>,
) -> Result<Vec<UserRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM users
        WHERE email = $1 AND ($2::uuid IS NULL OR restaurant_id = $2)
        ORDER BY created_at
        "#,
    )
    .bind(shared::util::normalize_email(email))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(User::try_from).transpose()
}

pub async fn list_by_restaurant(pool: &PgPool, restaurant_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    let rows: Vec<UserRow> =
        sqlx::query_as("SELECT * FROM users WHERE restaurant_id = $1 ORDER BY created_at")
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?;
    into_users(rows)
}

/// Delete a staff account of `restaurant_id`; returns whether a row went away
pub async fn delete(pool: &PgPool, restaurant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Create the platform operator if no account with that email exists yet
pub async fn ensure_operator(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    now: i64,
) -> ServiceResult<bool> {
    let existing = find_for_login(pool, email, None)
        .await?
        .into_iter()
        .any(|u| u.restaurant_id.is_none());
    if existing {
        return Ok(false);
    }

    insert(
        pool,
        NewUser {
            restaurant_id: None,
            email,
            password_hash,
            name: "Platform Operator",
            role: Role::SuperAdmin,
        },
        now,
    )
    .await?;
    Ok(true)
}
