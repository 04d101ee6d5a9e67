//! Orders: status machine, wire types and order codes

mod code;
mod status;
mod types;

pub use code::{generate_order_code, is_offline_code, offline_order_code};
pub use status::{OrderSource, OrderStatus};
pub use types::{
    CreateOrderItem, CreateOrderRequest, Order, OrderItem, OrderListQuery, OrderTable,
    UpdateStatusRequest,
};
