//! HTTP API for qrmenu-server
//!
//! One router per resource under `/api/v1`. Public routes (health, logins,
//! the QR menu) are merged outside the `authenticate` layer; every other
//! router carries its own role gates.

pub mod auth;
pub mod crm;
pub mod email;
pub mod health;
pub mod integrations;
pub mod menu;
pub mod orders;
pub mod tables;
pub mod users;
pub mod waiters;

use axum::{Router, middleware, routing::get};
use http::{HeaderName, HeaderValue, Method};
use serde::Deserialize;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::state::AppState;

/// `?restaurantId=` for operator calls on tenant-scoped routes
///
/// Ignored for tenant users, see [`Identity::restaurant_scope`](crate::auth::Identity::restaurant_scope).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub restaurant_id: Option<Uuid>,
}

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Permissive in development, the configured allow-list elsewhere
fn cors_layer(config: &Config) -> CorsLayer {
    if config.is_development() && config.frontend_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60))
}

/// Routes that require a bearer token
fn protected_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(waiters::router())
        .merge(menu::router())
        .merge(users::router())
        .merge(integrations::router())
        .merge(crm::router())
        .merge(email::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::authenticate,
        ))
}

/// Routes reachable without a token
fn public_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::public_router(state))
        .merge(menu::public_router())
}

/// Build the fully layered application
pub fn build_app(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(public_router(&state))
        .merge(protected_router(&state))
        // CORS - handle cross-origin requests
        .layer(cors_layer(&state.config))
        // Compression - gzip responses
        .layer(CompressionLayer::new())
        // Trace - request tracing (INFO)
        .layer(TraceLayer::new_for_http())
        // Propagate request ID to the response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        // Request ID - outermost so traces can see it
        .layer(SetRequestIdLayer::new(x_request_id, XRequestId))
        .with_state(state)
}
