//! Staff account API (tenant admin)

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get},
};
use shared::error::AppError;
use shared::models::{User, UserCreate};
use uuid::Uuid;

use crate::auth::middleware::MANAGERS;
use crate::auth::require_roles;
use crate::db::users;
use crate::error::ServiceResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1/users", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_roles(MANAGERS)))
}

/// Validate, hash and insert a staff account for `restaurant_id`
pub(crate) async fn create_staff(
    state: &AppState,
    restaurant_id: Uuid,
    payload: &UserCreate,
) -> ServiceResult<User> {
    payload.validate()?;

    let hash = crate::util::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let user = users::insert(
        &state.pool,
        users::NewUser {
            restaurant_id: Some(restaurant_id),
            email: &payload.email,
            password_hash: &hash,
            name: &payload.name,
            role: payload.role,
        },
        shared::util::now_millis(),
    )
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, restaurant_id = %restaurant_id, "Staff account created");
    Ok(user)
}
