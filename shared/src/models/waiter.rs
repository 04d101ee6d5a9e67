//! Waiter Model

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Waiter {
    pub id: i64,
    pub restaurant_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterCreate {
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Trimmed full name, at least 2 characters
pub fn validate_full_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(AppError::new(ErrorCode::WaiterNameTooShort).with_detail("fullName", trimmed));
    }
    Ok(trimmed.to_string())
}
