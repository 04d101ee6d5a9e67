//! qrmenu-server: restaurant QR-menu ordering platform
//!
//! Long-running service that:
//! - Serves the QR menu and takes customer orders
//! - Drives the kitchen/waiter/cashier order flow
//! - Provides the tenant back-office and the operator CRM

use std::net::SocketAddr;

use qrmenu_server::{AppState, Config, build_app};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qrmenu_server=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Create the platform operator from SUPER_ADMIN_EMAIL / SUPER_ADMIN_PASSWORD
async fn seed_operator(state: &AppState) -> Result<(), BoxError> {
    let Some(seed) = &state.config.operator else {
        return Ok(());
    };

    let hash = qrmenu_server::util::hash_password(&seed.password)
        .map_err(|e| format!("Password hashing failed: {e}"))?;
    let created = qrmenu_server::db::users::ensure_operator(
        &state.pool,
        &seed.email,
        &hash,
        shared::util::now_millis(),
    )
    .await
    .map_err(|e| format!("Operator bootstrap failed: {e:?}"))?;

    if created {
        tracing::info!(email = %seed.email, "Platform operator account created");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env()?;

    tracing::info!("Starting qrmenu-server (env: {})", config.environment);

    // Initialize application state
    let state = AppState::new(&config).await?;
    seed_operator(&state).await?;

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let app = build_app(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("qrmenu-server HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("qrmenu-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
