//! Input validation functions
//!
//! Every validator returns a [`ValidationError`] naming the offending field
//! so the backend can report it without extra bookkeeping.

use thiserror::Error;

/// Maximum username length in characters
pub const MAX_USERNAME_LEN: usize = 64;
/// Minimum password length in bytes
pub const MIN_PASSWORD_LEN: usize = 8;
/// bcrypt ignores everything past 72 bytes, so longer passwords are rejected
pub const MAX_PASSWORD_LEN: usize = 72;
/// Maximum item name length in characters
pub const MAX_ITEM_NAME_LEN: usize = 255;
/// Maximum item description length in characters
pub const MAX_ITEM_DESCRIPTION_LEN: usize = 4096;

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::new("username", "is required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::new("username", "must be at most 64 characters"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("username", "must not contain whitespace"));
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password", "is required"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new("password", "must be at least 8 characters"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ValidationError::new("password", "must be at most 72 bytes"));
    }
    Ok(())
}

/// Validate an item name
pub fn validate_item_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "is required"));
    }
    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::new("name", "must be at most 255 characters"));
    }
    Ok(())
}

/// Validate an item description
pub fn validate_item_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_ITEM_DESCRIPTION_LEN {
        return Err(ValidationError::new(
            "description",
            "must be at most 4096 characters",
        ));
    }
    Ok(())
}
