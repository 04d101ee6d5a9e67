//! Data models
//!
//! Wire types shared by the server and the client. JSON is camelCase;
//! ids are UUIDs for tenants, users and orders, snowflake `i64` elsewhere,
//! and timestamps are Unix milliseconds.

pub mod category;
pub mod crm;
pub mod dining_table;
pub mod email;
pub mod integration;
pub mod menu;
pub mod product;
pub mod restaurant;
pub mod user;
pub mod waiter;

pub use category::{
    Category, CategoryCreate, CategoryGroup, CategoryUpdate, category_parent, group_categories,
};
pub use crm::PlatformStats;
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, table_id};
pub use email::{BulkEmailRequest, BulkEmailResponse, EmailResult, EmailTemplate};
pub use integration::{IntegrationUpsert, Platform, PlatformIntegration};
pub use menu::PublicMenu;
pub use product::{AvailabilityUpdate, Product, ProductCreate, ProductUpdate};
pub use restaurant::{
    PublicRestaurant, Restaurant, RestaurantCreate, RestaurantProfileUpdate, RestaurantUpdate,
};
pub use user::{
    CustomerLoginRequest, CustomerLoginResponse, IdentityInfo, LoginRequest, LoginResponse, Role,
    User, UserCreate,
};
pub use waiter::{Waiter, WaiterCreate, WaiterUpdate};
