//! Authentication API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::{CUSTOMER_LOGIN, STAFF_LOGIN, limit_login};
use crate::state::AppState;

/// Staff and QR-customer logins, each behind its own rate limit
pub fn public_router(state: &AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/api/v1/auth/login", post(handler::login))
        .layer(middleware::from_fn_with_state(
            (state.clone(), STAFF_LOGIN),
            limit_login,
        ));

    let customer = Router::new()
        .route("/api/v1/auth/customer-login", post(handler::customer_login))
        .layer(middleware::from_fn_with_state(
            (state.clone(), CUSTOMER_LOGIN),
            limit_login,
        ));

    staff.merge(customer)
}

/// Any authenticated caller
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/auth/me", get(handler::me))
}
