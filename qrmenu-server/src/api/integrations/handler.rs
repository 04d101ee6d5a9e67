//! Integration handlers; credentials are accepted but never returned

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{IntegrationUpsert, Platform, PlatformIntegration};

use crate::api::ScopeQuery;
use crate::auth::Identity;
use crate::db::integrations;
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;

/// Blank strings count as "not provided"
fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *value = None;
    }
}

/// GET /api/v1/integrations
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Vec<PlatformIntegration>> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    Ok(Json(integrations::list(&state.pool, restaurant_id).await?))
}

/// PUT /api/v1/integrations/:platform
pub async fn upsert(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(platform): Path<String>,
    Query(scope): Query<ScopeQuery>,
    Json(mut payload): Json<IntegrationUpsert>,
) -> ApiResult<PlatformIntegration> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let platform: Platform = platform.parse()?;

    for field in [
        &mut payload.seller_id,
        &mut payload.store_name,
        &mut payload.store_link,
        &mut payload.api_key,
        &mut payload.api_secret,
        &mut payload.token,
    ] {
        blank_to_none(field);
    }

    let integration = integrations::upsert(
        &state.pool,
        restaurant_id,
        platform,
        &payload,
        shared::util::now_millis(),
    )
    .await?;

    tracing::info!(restaurant_id = %restaurant_id, platform = %platform, "Integration saved");
    Ok(Json(integration))
}

/// DELETE /api/v1/integrations/:platform
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(platform): Path<String>,
    Query(scope): Query<ScopeQuery>,
) -> Result<StatusCode, ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let platform: Platform = platform.parse()?;
    if !integrations::delete(&state.pool, restaurant_id, platform).await? {
        return Err(AppError::new(ErrorCode::IntegrationNotFound)
            .with_detail("platform", platform.as_str())
            .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
