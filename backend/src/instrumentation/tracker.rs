//! Operation tracker for storage calls
//!
//! Wraps a named, fallible unit of work and records its duration and
//! outcome. The result is handed back untouched.

use crate::instrumentation::{DB_OPERATIONS_TOTAL, DB_OPERATION_DURATION_SECONDS};
use std::future::Future;
use std::time::Instant;

/// Run `work`, recording one duration sample and one success/error count
/// under `operation`
///
/// ```ignore
/// let user = track_operation("get_user", async {
///     sqlx::query_as::<_, UserRecord>("SELECT ...").fetch_optional(pool).await
/// })
/// .await?;
/// ```
pub async fn track_operation<F, T, E>(operation: &'static str, work: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let result = work.await;
    let duration = started.elapsed().as_secs_f64();

    let status = if result.is_ok() { "success" } else { "error" };

    metrics::histogram!(DB_OPERATION_DURATION_SECONDS, "operation" => operation).record(duration);
    metrics::counter!(DB_OPERATIONS_TOTAL, "operation" => operation, "status" => status)
        .increment(1);

    result
}
