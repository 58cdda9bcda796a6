//! Identity token issuance and validation
//!
//! Tokens are HS256-signed JWTs valid for 24 hours. The signing key is
//! loaded once at startup (or generated for the lifetime of the process)
//! and is read-only afterwards, so [`TokenService`] can be cloned freely
//! across request tasks.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretVec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Issuer claim stamped on every token
pub const TOKEN_ISSUER: &str = "items-api";

/// Token lifetime in seconds (24 hours)
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Length of a generated signing key in bytes
pub const GENERATED_KEY_LEN: usize = 32;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// `alg` header value every accepted token must carry
const TOKEN_ALGORITHM_NAME: &str = "HS256";

/// Why a token was rejected
///
/// All variants collapse to the same 401 at the HTTP boundary; the
/// distinction only reaches logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not match")]
    SignatureMismatch,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("unexpected token algorithm")]
    WrongAlgorithm,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::WrongAlgorithm,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// The signing key could not be established
#[derive(Debug, Error)]
pub enum KeyInitializationError {
    #[error("failed to generate random signing key: {0}")]
    RandomSource(#[from] rand::Error),
}

/// A token could not be signed
#[derive(Debug, Error)]
#[error("failed to sign identity token: {0}")]
pub struct SigningError(#[from] jsonwebtoken::errors::Error);

/// Subject of an identity token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    /// Subject (user ID as a decimal string)
    pub sub: String,
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Symmetric token signing secret
///
/// Never logged: `Debug` prints a redaction marker.
pub struct SigningKey {
    secret: SecretVec<u8>,
    generated: bool,
}

impl SigningKey {
    /// Adopt a pre-shared secret verbatim
    pub fn from_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: SecretVec::new(secret.into()),
            generated: false,
        }
    }

    /// Generate a random key from the operating system RNG
    pub fn generate() -> Result<Self, KeyInitializationError> {
        let mut bytes = vec![0u8; GENERATED_KEY_LEN];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self {
            secret: SecretVec::new(bytes),
            generated: true,
        })
    }

    /// Use the configured secret, or generate one when it is absent or empty
    pub fn load(secret: Option<&str>) -> Result<Self, KeyInitializationError> {
        match secret.filter(|s| !s.is_empty()) {
            Some(secret) => Ok(Self::from_secret(secret.as_bytes())),
            None => {
                warn!(
                    "JWT secret not configured, generated a random signing key. \
                     Tokens will not survive a restart and will not be accepted by other instances."
                );
                Self::generate()
            }
        }
    }

    /// Whether this key was generated rather than configured
    pub fn is_generated(&self) -> bool {
        self.generated
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("secret", &"[REDACTED]")
            .field("generated", &self.generated)
            .finish()
    }
}

/// Pre-computed JWT keys, derived once from the signing key
struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Token service for issuing and validating identity tokens
///
/// Only constructible from an initialized [`SigningKey`]. Keys are wrapped
/// in an `Arc` for cheap cloning into application state.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<TokenKeys>,
}

impl TokenService {
    /// Build the service around an established signing key
    pub fn new(key: SigningKey) -> Self {
        let secret = key.secret.expose_secret();

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss", "sub"]);

        Self {
            keys: Arc::new(TokenKeys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
            }),
        }
    }

    /// Load or generate the signing key and build the service
    ///
    /// Call once at startup, before serving traffic.
    pub fn initialize(secret: Option<&str>) -> Result<Self, KeyInitializationError> {
        Ok(Self::new(SigningKey::load(secret)?))
    }

    /// Issue a token for `identity`, valid from now for 24 hours
    #[inline]
    pub fn issue(&self, identity: &Identity) -> Result<String, SigningError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, SigningError> {
        let expires_at = now + Duration::seconds(TOKEN_LIFETIME_SECS);

        let claims = Claims {
            user_id: identity.user_id,
            username: identity.username.clone(),
            sub: identity.user_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &self.keys.encoding,
        )?)
    }

    /// Validate a token and return the identity it carries
    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        check_header_algorithm(token)?;

        let data = decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)?;
        let claims = data.claims;

        if claims.sub != claims.user_id.to_string() {
            return Err(TokenError::Malformed(
                "subject does not match user id".to_string(),
            ));
        }

        Ok(Identity {
            user_id: claims.user_id,
            username: claims.username,
        })
    }
}

/// Reject any header whose `alg` is not exactly HS256
///
/// jsonwebtoken fails to parse headers naming `none` or an unknown
/// algorithm, which would otherwise surface as `Malformed`.
fn check_header_algorithm(token: &str) -> Result<(), TokenError> {
    let segment = token.split('.').next().unwrap_or_default();

    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("invalid header encoding: {}", e)))?;
    let header: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("invalid header: {}", e)))?;
    let header = header
        .as_object()
        .ok_or_else(|| TokenError::Malformed("header is not a JSON object".to_string()))?;

    match header.get("alg").and_then(serde_json::Value::as_str) {
        Some(TOKEN_ALGORITHM_NAME) => Ok(()),
        _ => Err(TokenError::WrongAlgorithm),
    }
}
