//! Platform operator (CRM) API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::middleware::OPERATOR;
use crate::auth::require_roles;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1/crm", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handler::stats))
        .route(
            "/restaurants",
            get(handler::list_restaurants).post(handler::create_restaurant),
        )
        .route("/restaurants/{id}", patch(handler::update_restaurant))
        .route(
            "/restaurants/{id}/users",
            get(handler::list_users).post(handler::create_user),
        )
        .layer(middleware::from_fn(require_roles(OPERATOR)))
}
