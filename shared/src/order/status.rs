//! Order status machine and order source

use crate::error::{AppError, ErrorCode};
use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
///
/// Wire values are the Turkish labels shown on every screen:
///
/// ```text
/// Mutfakta ─► Hazır ─┬─► Teslim Edildi ─────────┬─► Ödendi
///                    └─► Kuryeye Teslim Edildi ─┘
///
/// any non-terminal ─► İptal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// In the kitchen
    #[serde(rename = "Mutfakta")]
    InKitchen,
    /// Ready for pickup by a waiter or courier
    #[serde(rename = "Hazır")]
    Ready,
    /// Served at the table
    #[serde(rename = "Teslim Edildi")]
    Delivered,
    /// Handed to a courier (third-party orders)
    #[serde(rename = "Kuryeye Teslim Edildi")]
    CourierDelivered,
    /// Paid
    #[serde(rename = "Ödendi")]
    Paid,
    /// Cancelled
    #[serde(rename = "İptal")]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::InKitchen,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::CourierDelivered,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
    ];

    /// Wire/storage label
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InKitchen => "Mutfakta",
            OrderStatus::Ready => "Hazır",
            OrderStatus::Delivered => "Teslim Edildi",
            OrderStatus::CourierDelivered => "Kuryeye Teslim Edildi",
            OrderStatus::Paid => "Ödendi",
            OrderStatus::Cancelled => "İptal",
        }
    }

    /// `Ödendi` and `İptal` accept no further transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Statuses that count as revenue and stamp `paid_at`
    pub const fn is_revenue(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::CourierDelivered)
    }

    /// Whether the state machine has an edge from `self` to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (s, Cancelled) => !s.is_terminal(),
            (InKitchen, Ready) => true,
            (Ready, Delivered | CourierDelivered) => true,
            (Delivered | CourierDelivered, Paid) => true,
            _ => false,
        }
    }

    /// Whether `role` may move an order into this status
    ///
    /// Kitchen marks orders ready, waiters deliver them, the cashier
    /// (admin) and the platform operator may set anything.
    pub fn allowed_for(&self, role: Role) -> bool {
        match role {
            Role::Admin | Role::SuperAdmin => true,
            Role::Kitchen => matches!(self, OrderStatus::Ready),
            Role::Waiter => matches!(
                self,
                OrderStatus::Delivered | OrderStatus::CourierDelivered
            ),
            Role::Customer => false,
        }
    }

    /// Validate a transition requested by `role`
    pub fn check_transition(&self, next: OrderStatus, role: Role) -> Result<(), AppError> {
        if !next.allowed_for(role) {
            return Err(AppError::with_message(
                ErrorCode::PermissionDenied,
                format!("Role '{}' cannot set status '{}'", role, next),
            ));
        }
        if !self.can_transition_to(next) {
            let code = match self {
                OrderStatus::Paid => ErrorCode::OrderAlreadyPaid,
                OrderStatus::Cancelled => ErrorCode::OrderAlreadyCancelled,
                _ => ErrorCode::InvalidStatusTransition,
            };
            return Err(AppError::new(code)
                .with_detail("from", self.as_str())
                .with_detail("to", next.as_str()));
        }
        Ok(())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::new(ErrorCode::InvalidOrderStatus).with_detail("status", s)
            })
    }
}

/// Where an order came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSource {
    /// Dine-in order placed through the QR menu or by staff
    #[default]
    Restaurant,
    Yemeksepeti,
    Trendyol,
    Getir,
}

impl OrderSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Restaurant => "restaurant",
            OrderSource::Yemeksepeti => "yemeksepeti",
            OrderSource::Trendyol => "trendyol",
            OrderSource::Getir => "getir",
        }
    }

    pub const fn is_third_party(&self) -> bool {
        !matches!(self, OrderSource::Restaurant)
    }
}

impl fmt::Display for OrderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "restaurant" => Ok(OrderSource::Restaurant),
            "yemeksepeti" => Ok(OrderSource::Yemeksepeti),
            "trendyol" => Ok(OrderSource::Trendyol),
            "getir" => Ok(OrderSource::Getir),
            other => Err(AppError::new(ErrorCode::InvalidOrderSource).with_detail("source", other)),
        }
    }
}
