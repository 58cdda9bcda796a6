//! Authentication module
//!
//! Provides bcrypt credential hashing, HS256 identity tokens and the
//! request gate that enforces them.

mod jwt;
mod middleware;
mod password;

pub use jwt::{
    Claims, Identity, KeyInitializationError, SigningError, SigningKey, TokenError, TokenService,
    TOKEN_ISSUER, TOKEN_LIFETIME_SECS,
};
pub use middleware::{extract_bearer_token, require_auth, AuthUser, UNAUTHORIZED_MESSAGE};
pub use password::{CredentialError, PasswordService, DEFAULT_COST};
