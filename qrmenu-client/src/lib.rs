//! QR-menu client library
//!
//! API gateway, local JSON storage and the domain stores (auth, cart,
//! menu, orders, tables and waiters) the role screens render from.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod storage;
pub mod stores;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use storage::LocalStorage;
pub use stores::{AuthStore, CartStore, MenuStore, OrderStore, StaffStore, spawn_polling};

// Re-export shared types for convenience
pub use shared::models::{PublicMenu, Role};
pub use shared::order::{Order, OrderSource, OrderStatus};
pub use shared::report::{ReportPeriod, RevenueReport};
