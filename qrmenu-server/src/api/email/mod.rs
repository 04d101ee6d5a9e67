//! Bulk marketing mail API (platform operator)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::middleware::OPERATOR;
use crate::auth::require_roles;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1/email", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/template", get(handler::template))
        .route("/send", post(handler::send))
        .layer(middleware::from_fn(require_roles(OPERATOR)))
}
