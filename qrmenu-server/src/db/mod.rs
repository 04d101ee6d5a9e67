//! Database access layer
//!
//! Free functions over `&PgPool` (or an open transaction), one module per
//! table. Plain reads and writes return `sqlx::Error`; operations that enforce
//! business rules return [`ServiceResult`](crate::error::ServiceResult).

pub mod categories;
pub mod integrations;
pub mod orders;
pub mod products;
pub mod restaurants;
pub mod tables;
pub mod users;
pub mod waiters;

/// Decode a text column into one of the shared enums
pub(crate) fn decode_enum<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = shared::AppError>,
{
    value.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
