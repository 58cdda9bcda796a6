//! User service for registration and login
//!
//! Hashing and verification run on the blocking thread pool so the
//! deliberately slow bcrypt work never stalls request tasks.

use crate::auth::{Identity, PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{UserRecord, UserRepository};
use items_api_shared::types::{AuthResponse, LoginRequest, RegisterRequest};
use items_api_shared::validation::{validate_password, validate_username};
use items_api_shared::{User, ValidationError};
use sqlx::PgPool;
use tracing::{debug, info};
use validator::ValidateEmail;

/// Message for every failed login, whether the user or the password was wrong
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and sign them in
    pub async fn register(
        pool: &PgPool,
        passwords: &PasswordService,
        tokens: &TokenService,
        req: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        Self::validate_registration(&req)?;

        let password_hash = passwords.hash_async(req.password).await?;

        let record = UserRepository::create(pool, &req.username, &password_hash, &req.email)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    ApiError::Conflict("Username or email already registered".to_string())
                }
                other => ApiError::Database(other),
            })?;

        let user = User::from(record);
        let token = tokens.issue(&Identity::new(user.id, user.username.clone()))?;

        info!(user_id = user.id, "User registered");

        Ok(AuthResponse {
            token,
            user,
            message: "User registered successfully".to_string(),
        })
    }

    /// Log in with username and password
    ///
    /// An unknown username and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login(
        pool: &PgPool,
        passwords: &PasswordService,
        tokens: &TokenService,
        req: LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        if req.username.is_empty() || req.password.is_empty() {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }

        let record = UserRepository::find_by_username(pool, &req.username).await?;
        let record = Self::check_credentials(passwords, record, req.password).await?;

        let user = User::from(record);
        let token = tokens.issue(&Identity::new(user.id, user.username.clone()))?;

        Ok(AuthResponse {
            token,
            user,
            message: "Login successful".to_string(),
        })
    }

    /// Verify `password` against the stored record, if there is one
    ///
    /// A missing record still costs one bcrypt verification, against the
    /// placeholder hash, so response time does not reveal which usernames
    /// exist.
    async fn check_credentials(
        passwords: &PasswordService,
        record: Option<UserRecord>,
        password: String,
    ) -> Result<UserRecord, ApiError> {
        let Some(record) = record else {
            passwords.verify_placeholder_async(password).await;
            debug!("Login for unknown username");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
        };

        if !passwords
            .verify_async(password, record.password_hash.clone())
            .await
        {
            debug!(user_id = record.id, "Login with wrong password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
        }

        Ok(record)
    }

    fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
        validate_username(&req.username)?;
        validate_password(&req.password)?;
        if !req.email.validate_email() {
            return Err(ValidationError::new("email", "must be a valid email address"));
        }
        Ok(())
    }
}
