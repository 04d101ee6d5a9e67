//! Menu API: public QR menu plus the admin's catalog management

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::middleware::MANAGERS;
use crate::auth::require_roles;
use crate::state::AppState;

/// QR menu, no token needed
pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/v1/menu/public/{slug}", get(handler::public_menu))
}

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1/menu", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handler::list_categories).post(handler::create_category),
        )
        .route(
            "/categories/{id}",
            patch(handler::update_category).delete(handler::delete_category),
        )
        .route(
            "/products",
            get(handler::list_products).post(handler::create_product),
        )
        .route(
            "/products/{id}",
            patch(handler::update_product).delete(handler::delete_product),
        )
        .route("/products/{id}/availability", patch(handler::set_availability))
        .route(
            "/restaurant",
            get(handler::get_restaurant).patch(handler::update_restaurant),
        )
        .layer(middleware::from_fn(require_roles(MANAGERS)))
}
