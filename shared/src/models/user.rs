//! Staff accounts, roles and auth payloads

use super::restaurant::PublicRestaurant;
use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Minimum password length for staff accounts
pub const MIN_PASSWORD_LEN: usize = 6;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Restaurant manager, doubles as cashier
    Admin,
    Waiter,
    Kitchen,
    /// Synthetic identity issued by QR-menu login
    Customer,
    /// Platform operator, not bound to a restaurant
    SuperAdmin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
            Role::Customer => "customer",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Roles a tenant admin (or the CRM) may create as staff accounts
    pub const fn is_assignable_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Waiter | Role::Kitchen)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "waiter" => Ok(Role::Waiter),
            "kitchen" => Ok(Role::Kitchen),
            "customer" => Ok(Role::Customer),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(AppError::with_message(
                ErrorCode::RoleNotAssignable,
                format!("Unknown role: {other}"),
            )),
        }
    }
}

/// Staff account as exposed by the API (never carries the hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create staff account payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.role.is_assignable_staff() {
            return Err(AppError::new(ErrorCode::RoleNotAssignable)
                .with_detail("role", self.role.as_str()));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.name.trim().is_empty() {
            return Err(AppError::with_message(ErrorCode::RequiredField, "name is required"));
        }
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::with_message(ErrorCode::InvalidFormat, "Invalid email address")
            .with_detail("email", email));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    Ok(())
}

/// `POST /api/v1/auth/login`
///
/// The SPA historically sent `username`; both spellings are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, alias = "username")]
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub restaurant_slug: Option<String>,
    #[serde(default)]
    pub restaurant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// `POST /api/v1/auth/customer-login`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLoginRequest {
    pub restaurant_slug: String,
    pub table_number: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLoginResponse {
    pub token: String,
    pub restaurant: PublicRestaurant,
    pub table_number: i32,
}

/// `GET /api/v1/auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityInfo {
    /// User id, or `customer:<restaurant>:<table>` for QR customers
    pub subject: String,
    pub restaurant_id: Option<Uuid>,
    pub role: Role,
    pub table_number: Option<i32>,
    pub expires_at: i64,
}
