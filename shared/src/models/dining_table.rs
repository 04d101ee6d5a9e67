//! Dining Table Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dining table; the id is derived from the restaurant and table number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: String,
    pub restaurant_id: Uuid,
    pub table_number: i32,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub table_number: i32,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    pub is_active: Option<bool>,
}

/// Deterministic table id: `<restaurant-id>-T003`
pub fn table_id(restaurant_id: &Uuid, table_number: i32) -> String {
    format!("{}-T{:03}", restaurant_id, table_number)
}
