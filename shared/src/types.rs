//! API request and response types

use crate::models::{Item, User};
use serde::{Deserialize, Serialize};

/// Default page size for item listings
pub const DEFAULT_PAGE_LIMIT: i64 = 50;
/// Upper bound for a single page of items
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Generic response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
        }
    }

    /// Successful response carrying data and a message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
            data: None,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response to a successful registration or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub message: String,
}

/// Item creation/update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Query parameters for listing items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ItemListQuery {
    /// Clamp pagination to sane bounds, filling in defaults
    pub fn normalize(self) -> NormalizedItemListQuery {
        NormalizedItemListQuery {
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

/// Pagination after [`ItemListQuery::normalize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedItemListQuery {
    pub limit: i64,
    pub offset: i64,
}

/// Page of items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<Item>,
    pub limit: i64,
    pub offset: i64,
}

/// Payload of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthInfo {
    pub version: String,
    pub uptime_secs: u64,
}
