//! Request and storage instrumentation
//!
//! Metrics are recorded through the `metrics` facade into a process-wide
//! Prometheus recorder, which the `/metrics` route renders in the text
//! exposition format.
//!
//! | metric | kind | labels |
//! |---|---|---|
//! | `http_requests_total` | counter | method, path, status |
//! | `http_request_duration_seconds` | histogram | method, path |
//! | `http_response_size_bytes` | histogram | method, path |
//! | `db_operations_total` | counter | operation, status |
//! | `db_operation_duration_seconds` | histogram | operation |

pub mod middleware;
pub mod tracker;

pub use middleware::track_metrics;
pub use tracker::track_operation;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const HTTP_RESPONSE_SIZE_BYTES: &str = "http_response_size_bytes";
pub const DB_OPERATIONS_TOTAL: &str = "db_operations_total";
pub const DB_OPERATION_DURATION_SECONDS: &str = "db_operation_duration_seconds";

/// Path label for requests no route matched
pub const UNMATCHED_PATH: &str = "unmatched";

/// Latency buckets in seconds
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Response size buckets in bytes: 100 * 10^k for k in 0..8
const SIZE_BUCKETS: &[f64] = &[1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9];

static RECORDER: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder
///
/// Idempotent: later calls return a handle to the recorder installed by the
/// first one.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    RECORDER
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                    DURATION_BUCKETS,
                )?
                .set_buckets_for_metric(
                    Matcher::Full(HTTP_RESPONSE_SIZE_BYTES.to_string()),
                    SIZE_BUCKETS,
                )?
                .set_buckets_for_metric(
                    Matcher::Full(DB_OPERATION_DURATION_SECONDS.to_string()),
                    DURATION_BUCKETS,
                )?
                .install_recorder()?;

            describe_metrics();
            info!("Prometheus metrics recorder installed");
            Ok(handle)
        })
        .cloned()
}

fn describe_metrics() {
    metrics::describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests by method, path and status"
    );
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    metrics::describe_histogram!(
        HTTP_RESPONSE_SIZE_BYTES,
        metrics::Unit::Bytes,
        "HTTP response size in bytes"
    );
    metrics::describe_counter!(DB_OPERATIONS_TOTAL, "Total number of database operations");
    metrics::describe_histogram!(
        DB_OPERATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Database operation duration in seconds"
    );
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_recorder_is_idempotent() {
        let first = install_recorder().unwrap();
        let second = install_recorder().unwrap();

        metrics::counter!("recorder_idempotence_probe").increment(1);

        assert!(first.render().contains("recorder_idempotence_probe"));
        assert!(second.render().contains("recorder_idempotence_probe"));
    }

    #[test]
    fn test_sample_parsing() {
        let rendered = "\
# TYPE http_requests_total counter
http_requests_total{method=\"GET\",path=\"/a\",status=\"OK\"} 3
http_requests_total{method=\"GET\",path=\"/a\",status=\"Unauthorized\"} 2
";
        assert_eq!(
            testing::sample(rendered, HTTP_REQUESTS_TOTAL, &[("path", "/a"), ("status", "OK")]),
            Some(3.0)
        );
        assert_eq!(testing::sum(rendered, HTTP_REQUESTS_TOTAL, &[("path", "/a")]), 5.0);
        assert_eq!(testing::sample(rendered, HTTP_REQUESTS_TOTAL, &[("path", "/b")]), None);
    }
}
