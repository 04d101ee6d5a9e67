//! Authentication: JWT, middleware and login rate limiting

pub mod jwt;
pub mod middleware;
pub mod rate_limit;

pub use jwt::{Identity, JwtError, JwtService};
pub use middleware::{authenticate, require_roles};
pub use rate_limit::RateLimiter;
