//! Delivery platform integrations (credentials are write-only)

use shared::models::{IntegrationUpsert, Platform, PlatformIntegration};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_enum;

#[derive(Debug, sqlx::FromRow)]
struct IntegrationRow {
    platform: String,
    seller_id: Option<String>,
    store_name: Option<String>,
    store_link: Option<String>,
    is_active: bool,
    has_api_key: bool,
    has_api_secret: bool,
    has_token: bool,
    updated_at: i64,
}

impl TryFrom<IntegrationRow> for PlatformIntegration {
    type Error = sqlx::Error;

    fn try_from(row: IntegrationRow) -> Result<Self, Self::Error> {
        Ok(PlatformIntegration {
            platform: decode_enum(&row.platform)?,
            seller_id: row.seller_id,
            store_name: row.store_name,
            store_link: row.store_link,
            is_active: row.is_active,
            has_api_key: row.has_api_key,
            has_api_secret: row.has_api_secret,
            has_token: row.has_token,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = r#"
    platform, seller_id, store_name, store_link, is_active,
    api_key IS NOT NULL AS has_api_key,
    api_secret IS NOT NULL AS has_api_secret,
    token IS NOT NULL AS has_token,
    updated_at
"#;

pub async fn list(
    pool: &PgPool,
    restaurant_id: Uuid,
) -> Result<Vec<PlatformIntegration>, sqlx::Error> {
    let rows: Vec<IntegrationRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM platform_integrations WHERE restaurant_id = $1 ORDER BY platform"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(PlatformIntegration::try_from).collect()
}

/// Insert or update; absent credentials keep their stored value
pub async fn upsert(
    pool: &PgPool,
    restaurant_id: Uuid,
    platform: Platform,
    data: &IntegrationUpsert,
    now: i64,
) -> Result<PlatformIntegration, sqlx::Error> {
    let row: IntegrationRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO platform_integrations (
            id, restaurant_id, platform, seller_id, store_name, store_link,
            api_key, api_secret, token, is_active, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, TRUE), $11)
        ON CONFLICT (restaurant_id, platform) DO UPDATE SET
            seller_id = COALESCE(EXCLUDED.seller_id, platform_integrations.seller_id),
            store_name = COALESCE(EXCLUDED.store_name, platform_integrations.store_name),
            store_link = COALESCE(EXCLUDED.store_link, platform_integrations.store_link),
            api_key = COALESCE(EXCLUDED.api_key, platform_integrations.api_key),
            api_secret = COALESCE(EXCLUDED.api_secret, platform_integrations.api_secret),
            token = COALESCE(EXCLUDED.token, platform_integrations.token),
            is_active = COALESCE($10, platform_integrations.is_active),
            updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}
        "#
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(platform.as_str())
    .bind(&data.seller_id)
    .bind(&data.store_name)
    .bind(&data.store_link)
    .bind(&data.api_key)
    .bind(&data.api_secret)
    .bind(&data.token)
    .bind(data.is_active)
    .bind(now)
    .fetch_one(pool)
    .await?;
    PlatformIntegration::try_from(row)
}

pub async fn delete(pool: &PgPool, restaurant_id: Uuid, platform: Platform) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM platform_integrations WHERE restaurant_id = $1 AND platform = $2")
            .bind(restaurant_id)
            .bind(platform.as_str())
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
