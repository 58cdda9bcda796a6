//! Items API Shared Library
//!
//! This crate contains the wire types and input validation shared by the
//! backend and its clients.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::{Item, User};
pub use types::*;
pub use validation::ValidationError;
