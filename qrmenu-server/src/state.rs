//! Application state for qrmenu-server

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::auth::{JwtService, RateLimiter};
use crate::config::Config;
use crate::email::{Mailer, SesMailer};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Staff and customer token issuer
    pub jwt: JwtService,
    /// Marketing mail relay
    pub mailer: Arc<dyn Mailer>,
    /// Rate limiter for the login routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect, migrate and build the SES relay
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let mailer = SesMailer::from_config(config).await;

        Ok(Self::from_parts(pool, config.clone(), Arc::new(mailer)))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            jwt: JwtService::new(&config.jwt_secret, config.jwt_expiry_hours),
            pool,
            config: Arc::new(config),
            mailer,
            rate_limiter: RateLimiter::new(),
        }
    }
}
