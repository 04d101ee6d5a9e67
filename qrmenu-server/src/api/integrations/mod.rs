//! Delivery platform integration API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::middleware::MANAGERS;
use crate::auth::require_roles;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1/integrations", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{platform}", put(handler::upsert).delete(handler::delete))
        .layer(middleware::from_fn(require_roles(MANAGERS)))
}
