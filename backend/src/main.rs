//! Items API Backend
//!
//! User registration and login with signed identity tokens, a small
//! authenticated items API, and Prometheus request and storage metrics.
//!
//! ## Architecture
//!
//! - Routes: HTTP handling, authentication gate, request metrics
//! - Services: Validation and business logic
//! - Repositories: Tracked data access
//! - Database: PostgreSQL with SQLx

use anyhow::{Context, Result};
use items_api_backend::{config, db, instrumentation, routes, state::AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Items API"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let metrics = instrumentation::install_recorder()
        .context("failed to install Prometheus recorder")?;

    info!("Connecting to database...");
    let db_pool = db::connect_with_retry(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    // No signing key or credential hashing, no server
    let state = AppState::new(db_pool, config.clone(), metrics)
        .context("failed to initialize authentication services")?;

    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "items_api_backend=info,tower_http=info".into()
        } else {
            "items_api_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Refuse to serve production traffic with an unsafe configuration
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    let problems = config.production_problems();
    for problem in &problems {
        error!("Configuration error: {}", problem);
    }
    if !problems.is_empty() {
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Could not install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Ctrl+C handler failed, shutting down");
            }
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
