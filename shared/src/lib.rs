//! Shared types for the QR-menu platform
//!
//! Types used by both the server and the client library: the error system,
//! wire models, the order status machine, money helpers and the report
//! window calculation.

pub mod error;
pub mod models;
pub mod money;
pub mod order;
pub mod report;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use order::{OrderSource, OrderStatus};
