//! Authentication and role-gate middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;
use shared::models::Role;

use super::jwt::{Identity, JwtError, JwtService};
use crate::state::AppState;

/// Require a valid bearer token
///
/// Inserts the decoded [`Identity`] into the request extensions.
///
/// | Failure | Code |
/// |---------|------|
/// | no / malformed Authorization header | 401 NotAuthenticated / TokenInvalid |
/// | expired token | 401 TokenExpired |
/// | bad signature or claims | 401 TokenInvalid |
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::debug!(uri = %req.uri(), "Missing Authorization header");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt.validate_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(Identity::from(claims));
            Ok(next.run(req).await)
        }
        Err(JwtError::ExpiredToken) => Err(AppError::token_expired()),
        Err(e) => {
            tracing::warn!(error = %e, uri = %req.uri(), "JWT validation failed");
            Err(AppError::invalid_token("Invalid token"))
        }
    }
}

/// Role gate: 401 without an identity, 403 when the role is not listed
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_roles(ADMIN)));
/// ```
pub fn require_roles(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let identity = req
                .extensions()
                .get::<Identity>()
                .ok_or_else(AppError::unauthorized)?;

            if !roles.contains(&identity.role) {
                tracing::warn!(
                    subject = %identity.subject,
                    role = %identity.role,
                    uri = %req.uri(),
                    "Role not allowed"
                );
                return Err(AppError::forbidden(format!(
                    "Role '{}' is not allowed here",
                    identity.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Tenant admin
pub const ADMIN: &[Role] = &[Role::Admin];
/// Tenant admin or platform operator
pub const MANAGERS: &[Role] = &[Role::Admin, Role::SuperAdmin];
/// Restaurant staff plus the operator
pub const STAFF: &[Role] = &[Role::Admin, Role::Waiter, Role::Kitchen, Role::SuperAdmin];
/// Who may place orders
pub const ORDER_CREATORS: &[Role] = &[Role::Customer, Role::Waiter, Role::Admin];
/// Platform operator
pub const OPERATOR: &[Role] = &[Role::SuperAdmin];
