//! Domain stores the screens render from

pub mod auth;
pub mod cart;
pub mod menu;
pub mod orders;
pub mod staff;

pub use auth::{AuthStore, Session};
pub use cart::{CartLine, CartStore};
pub use menu::MenuStore;
pub use orders::{MAX_REPLAY_ATTEMPTS, OrderStore, OutboxEntry, Poller, TableBill, spawn_polling};
pub use staff::StaffStore;
