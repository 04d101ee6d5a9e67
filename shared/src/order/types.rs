//! Order wire types

use super::status::{OrderSource, OrderStatus};
use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order line, with the product name and unit price snapshotted at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Table reference nested in an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTable {
    pub id: String,
    pub table_number: i32,
}

/// Order as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_code: String,
    pub restaurant_id: Uuid,
    /// `None` for third-party/courier orders
    pub table: Option<OrderTable>,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub total: f64,
    pub customer_note: Option<String>,
    pub source: OrderSource,
    pub created_at: i64,
    pub paid_at: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn table_number(&self) -> Option<i32> {
        self.table.as_ref().map(|t| t.table_number)
    }
}

/// Item submitted with a new order
///
/// `name` and `price` are what the client displayed; the server snapshots
/// the stored product instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

/// `POST /api/v1/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Absent or 0 marks a third-party order
    #[serde(default)]
    pub table_number: Option<i32>,
    pub items: Vec<CreateOrderItem>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub source: Option<OrderSource>,
}

impl CreateOrderRequest {
    /// Table number for dine-in orders, `None` for third-party orders
    pub fn dine_in_table(&self) -> Option<i32> {
        self.table_number.filter(|n| *n != 0)
    }

    /// Source the order is stored with
    ///
    /// A table order is always `restaurant`; an order without a table must
    /// name the delivery platform it came from.
    pub fn resolve_source(&self) -> Result<OrderSource, AppError> {
        match (self.dine_in_table(), self.source) {
            (Some(_), None | Some(OrderSource::Restaurant)) => Ok(OrderSource::Restaurant),
            (Some(table), Some(source)) => Err(AppError::with_message(
                ErrorCode::InvalidOrderSource,
                format!("{source} orders cannot be placed on a table"),
            )
            .with_detail("tableNumber", table)
            .with_detail("source", source.as_str())),
            (None, Some(source)) if source.is_third_party() => Ok(source),
            (None, _) => Err(AppError::with_message(
                ErrorCode::InvalidOrderSource,
                "Orders without a table need a delivery platform source",
            )
            .with_detail("field", "source")),
        }
    }
}

/// `PATCH /api/v1/orders/:id/status`
///
/// The status stays a raw string here so an unknown value surfaces as a
/// typed `InvalidOrderStatus` error instead of a JSON rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// `GET /api/v1/orders?status=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}
