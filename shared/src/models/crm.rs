//! Platform operator (CRM) payloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `GET /api/v1/crm/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_restaurants: i64,
    pub active_restaurants: i64,
    pub inactive_restaurants: i64,
    /// Restaurant count per contract status
    pub by_contract_status: BTreeMap<String, i64>,
    /// Σ monthly fee of active restaurants
    pub monthly_recurring_revenue: f64,
    pub total_orders: i64,
}
