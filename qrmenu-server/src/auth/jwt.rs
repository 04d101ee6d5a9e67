//! JWT token service
//!
//! Staff tokens carry the user id, restaurant and role. QR-menu customers get
//! a synthetic identity bound to a restaurant and table.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{IdentityInfo, Role};
use thiserror::Error;
use uuid::Uuid;

/// Customer tokens are always valid for a day
pub const CUSTOMER_TOKEN_HOURS: i64 = 24;

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, or `customer:<restaurant>:<table>`
    pub sub: String,
    /// `None` only for the platform operator
    pub restaurant_id: Option<Uuid>,
    pub role: Role,
    /// Set for customer tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i32>,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Issued at (Unix seconds)
    pub iat: i64,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// HS256 token issuer/validator
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Token for a staff account
    pub fn issue_staff(
        &self,
        user_id: Uuid,
        restaurant_id: Option<Uuid>,
        role: Role,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: user_id.to_string(),
            restaurant_id,
            role,
            table_number: None,
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
            iat: now.timestamp(),
        })
    }

    /// Token for a QR-menu customer sitting at `table_number`
    pub fn issue_customer(&self, restaurant_id: Uuid, table_number: i32) -> Result<String, JwtError> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: format!("customer:{restaurant_id}:{table_number}"),
            restaurant_id: Some(restaurant_id),
            role: Role::Customer,
            table_number: Some(table_number),
            exp: (now + Duration::hours(CUSTOMER_TOKEN_HOURS)).timestamp(),
            iat: now.timestamp(),
        })
    }

    /// Validate signature and expiry, return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Extract the token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Identity attached to authenticated requests
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject: String,
    pub restaurant_id: Option<Uuid>,
    pub role: Role,
    pub table_number: Option<i32>,
    pub expires_at: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            restaurant_id: claims.restaurant_id,
            role: claims.role,
            table_number: claims.table_number,
            expires_at: claims.exp,
        }
    }
}

impl Identity {
    /// Restaurant the caller acts for; orders and tenant data are always
    /// scoped by it.
    pub fn require_restaurant(&self) -> Result<Uuid, AppError> {
        self.restaurant_id
            .ok_or_else(|| AppError::new(ErrorCode::TenantNotSelected))
    }

    /// Restaurant a request operates on
    ///
    /// Tenant users are pinned to their own restaurant. The platform operator
    /// has none and must name one (`?restaurantId=`).
    pub fn restaurant_scope(&self, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        match self.role {
            Role::SuperAdmin => requested
                .or(self.restaurant_id)
                .ok_or_else(|| AppError::new(ErrorCode::TenantNotSelected)),
            _ => self.require_restaurant(),
        }
    }

    /// Staff user id (customers have none)
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.subject).ok()
    }

    pub fn info(&self) -> IdentityInfo {
        IdentityInfo {
            subject: self.subject.clone(),
            restaurant_id: self.restaurant_id,
            role: self.role,
            table_number: self.table_number,
            expires_at: self.expires_at,
        }
    }
}
