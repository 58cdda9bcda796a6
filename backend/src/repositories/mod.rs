//! Database repositories
//!
//! Every query runs inside [`track_operation`](crate::instrumentation::track_operation)
//! under a stable operation name, so storage latency and failures show up
//! in the `db_operation_*` metrics.

pub mod item;
pub mod user;

pub use item::{ItemRecord, ItemRepository};
pub use user::{UserRecord, UserRepository};
