//! Password hashing using bcrypt
//!
//! Provides salted, adaptive password hashing and verification.
//!
//! # Performance Considerations
//!
//! bcrypt at the default cost is intentionally CPU-intensive (around a
//! second per call). In async contexts use the `*_async` variants, which
//! run on the blocking thread pool.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Work factor used when none is configured
pub const DEFAULT_COST: u32 = 14;

/// Plaintext behind the placeholder hash checked for unknown users
const PLACEHOLDER_PASSWORD: &str = "placeholder-credential-never-issued";

/// Credential hashing failures
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Password hashing service
///
/// Hashes embed their salt and cost, so verification does not depend on
/// the cost this service was created with. Clones share one placeholder
/// hash, used to give unknown users the same verification cost as known
/// ones.
#[derive(Debug, Clone)]
pub struct PasswordService {
    cost: u32,
    placeholder: Arc<OnceCell<String>>,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            placeholder: Arc::new(OnceCell::new()),
        }
    }

    /// Work factor applied to new hashes
    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns `false` for a wrong password and for a malformed hash alike.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(&self, password: String) -> Result<String, CredentialError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password)).await?
    }

    /// Verify a password on the blocking thread pool
    ///
    /// A failed worker counts as a failed verification.
    pub async fn verify_async(&self, password: String, hash: String) -> bool {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&password, &hash))
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "Password verification task failed");
                false
            })
    }

    /// Hash the placeholder credential at the configured cost
    ///
    /// Call once at startup so the first unknown-user login does not pay
    /// for hashing as well. Later calls are free.
    pub fn prepare_placeholder(&self) -> Result<(), CredentialError> {
        self.placeholder
            .get_or_try_init(|| self.hash(PLACEHOLDER_PASSWORD))
            .map(|_| ())
    }

    /// Spend one verification on the placeholder hash, always failing
    ///
    /// Login for an unknown user runs this so it takes as long as a wrong
    /// password for a known one.
    pub async fn verify_placeholder_async(&self, password: String) -> bool {
        let service = self.clone();
        let ran = tokio::task::spawn_blocking(move || {
            let placeholder = service
                .placeholder
                .get_or_try_init(|| service.hash(PLACEHOLDER_PASSWORD))?;
            service.verify(&password, placeholder);
            Ok::<_, CredentialError>(())
        })
        .await;

        if let Err(e) = ran.map_err(CredentialError::from).and_then(|r| r) {
            debug!(error = %e, "Placeholder verification failed");
        }
        false
    }

    /// Whether the placeholder hash has been computed
    pub fn placeholder_ready(&self) -> bool {
        self.placeholder.get().is_some()
    }
}
