//! Business logic services
//!
//! Services validate input and coordinate between repositories and the
//! authentication primitives.

pub mod item;
pub mod user;

pub use item::ItemService;
pub use user::UserService;
