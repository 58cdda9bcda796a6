//! Application state management
//!
//! Shared resources handed to every request handler via Axum's state
//! extraction. Everything here is built once at startup and is read-only
//! while requests are served, so cloning is a handful of `Arc` bumps.

use crate::auth::{CredentialError, KeyInitializationError, PasswordService, TokenService};
use crate::config::AppConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Failure to build the authentication services at startup
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Key(#[from] KeyInitializationError),

    #[error("credential hashing unavailable: {0}")]
    Credentials(#[from] CredentialError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token issuance and validation with the process signing key
    pub tokens: TokenService,
    /// Credential hashing at the configured cost
    pub passwords: PasswordService,
    /// Handle to the Prometheus recorder, rendered by `/metrics`
    pub metrics: PrometheusHandle,
    /// Process start, reported by the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Create the application state
    ///
    /// Initializes the signing key from `auth.jwt_secret`, generating one
    /// when unset, and hashes the unknown-user placeholder at the
    /// configured cost. Fails if either cannot be done; the server must not
    /// start accepting requests in that case.
    pub fn new(db: PgPool, config: AppConfig, metrics: PrometheusHandle) -> Result<Self, StateError> {
        let tokens = TokenService::initialize(config.auth.jwt_secret.as_deref())?;
        let passwords = PasswordService::new(config.auth.bcrypt_cost);
        passwords.prepare_placeholder()?;

        info!(bcrypt_cost = passwords.cost(), "Authentication services initialized");

        Ok(Self {
            db,
            config: Arc::new(config),
            tokens,
            passwords,
            metrics,
            started_at: Instant::now(),
        })
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }
}
