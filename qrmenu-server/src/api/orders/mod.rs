//! Orders API

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::middleware::{MANAGERS, ORDER_CREATORS, STAFF};
use crate::auth::require_roles;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1/orders", routes())
}

fn routes() -> Router<AppState> {
    // Kitchen, waiter and cashier screens
    let staff_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_roles(STAFF)));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_roles(ORDER_CREATORS)));

    let manage_routes = Router::new()
        .route("/report", get(handler::report))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_roles(MANAGERS)));

    staff_routes.merge(create_routes).merge(manage_routes)
}
