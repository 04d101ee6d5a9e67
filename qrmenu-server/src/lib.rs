//! qrmenu-server: HTTP API for the QR-menu restaurant platform
//!
//! - QR-menu customer ordering (`/api/v1/auth/customer-login`, `/api/v1/orders`)
//! - kitchen, waiter and cashier order views with a checked status machine
//! - tenant admin back-office (menu, tables, waiters, staff, integrations)
//! - operator CRM and bulk marketing mail

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod state;
pub mod util;

pub use api::build_app;
pub use config::Config;
pub use state::AppState;
