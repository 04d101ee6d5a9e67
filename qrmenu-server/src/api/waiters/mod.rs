//! Waiter API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::middleware::{MANAGERS, STAFF};
use crate::auth::require_roles;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1/waiters", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_roles(STAFF)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", patch(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_roles(MANAGERS)));

    read_routes.merge(manage_routes)
}
