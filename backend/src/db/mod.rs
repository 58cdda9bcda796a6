//! Database connection and pool management
//!
//! The first connection is retried a fixed number of times so the service
//! survives starting up alongside its database.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Create a PostgreSQL connection pool, retrying failed connects
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    let attempts = config.connect_attempts.max(1);
    let delay = Duration::from_secs(config.connect_retry_delay_secs);

    let mut attempt = 1;
    loop {
        match create_pool(config).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < attempts => {
                warn!(
                    attempt,
                    attempts,
                    error = %e,
                    "Database connection failed, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("could not connect to database after {} attempts", attempts)
                })
            }
        }
    }
}

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let connect_options =
        PgConnectOptions::from_str(&config.url)?.application_name("items-api");

    let pool = pool_options(config).connect_with(connect_options).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Pool sizing and connection recycling from configuration
fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
}

/// Run embedded database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_invalid_url_fails_without_retrying() {
        let config = DatabaseConfig {
            url: "not a url".to_string(),
            max_connections: 1,
            connect_attempts: 1,
            connect_retry_delay_secs: 0,
            ..AppConfig::default().database
        };
        assert!(connect_with_retry(&config).await.is_err());
    }

    #[test]
    fn test_pool_options_follow_config() {
        let config = DatabaseConfig {
            max_connections: 12,
            min_connections: 3,
            idle_timeout_secs: 90,
            max_lifetime_secs: 300,
            ..AppConfig::default().database
        };

        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 12);
        assert_eq!(options.get_min_connections(), 3);
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(options.get_max_lifetime(), Some(Duration::from_secs(300)));
        assert_eq!(
            options.get_acquire_timeout(),
            Duration::from_secs(ACQUIRE_TIMEOUT_SECS)
        );
        assert!(options.get_test_before_acquire());
    }

    #[test]
    fn test_min_connections_capped_by_max() {
        let config = DatabaseConfig {
            max_connections: 1,
            min_connections: 10,
            ..AppConfig::default().database
        };
        assert_eq!(pool_options(&config).get_min_connections(), 1);
    }
}
