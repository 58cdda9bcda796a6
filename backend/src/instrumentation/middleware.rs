//! HTTP request metrics middleware
//!
//! Every request yields exactly one duration sample, one request count and
//! one response size sample. The observation travels with the response
//! body and is recorded when the body finishes streaming, or when it is
//! dropped. A handler error, a recovered panic, a timeout and a cancelled
//! request all record exactly once.

use crate::instrumentation::{
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_RESPONSE_SIZE_BYTES, UNMATCHED_PATH,
};
use axum::{
    body::{Body, Bytes},
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::{
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

/// Middleware recording request latency, outcome and response size
///
/// Install with `axum::middleware::from_fn(track_metrics)` outside any
/// layer that may short-circuit (authentication, timeouts, panic recovery).
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let mut observation = RequestObservation::start(&request);

    let response = next.run(request).await;
    observation.status = response.status();

    let (parts, body) = response.into_parts();
    Response::from_parts(
        parts,
        Body::new(InstrumentedBody {
            inner: body,
            observation,
        }),
    )
}

/// Pending metrics for one request, recorded exactly once
struct RequestObservation {
    method: String,
    path: String,
    started: Instant,
    status: StatusCode,
    bytes: u64,
    recorded: bool,
}

impl RequestObservation {
    fn start(request: &Request) -> Self {
        // Route templates only, so ids and scanned paths don't explode label cardinality
        let path = request
            .extensions()
            .get::<MatchedPath>()
            .map_or(UNMATCHED_PATH, MatchedPath::as_str)
            .to_owned();

        Self {
            method: request.method().to_string(),
            path,
            started: Instant::now(),
            // Matches the implicit-success convention when no status is set
            status: StatusCode::OK,
            bytes: 0,
            recorded: false,
        }
    }

    fn record(&mut self) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let duration = self.started.elapsed().as_secs_f64();
        let status = self.status.canonical_reason().unwrap_or("Unknown").to_string();

        let route = [("method", self.method.clone()), ("path", self.path.clone())];
        let outcome = [
            ("method", self.method.clone()),
            ("path", self.path.clone()),
            ("status", status),
        ];

        metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, &route).record(duration);
        metrics::counter!(HTTP_REQUESTS_TOTAL, &outcome).increment(1);
        metrics::histogram!(HTTP_RESPONSE_SIZE_BYTES, &route).record(self.bytes as f64);
    }
}

impl Drop for RequestObservation {
    fn drop(&mut self) {
        self.record();
    }
}

/// Response body wrapper counting streamed bytes
struct InstrumentedBody {
    inner: Body,
    observation: RequestObservation,
}

impl HttpBody for InstrumentedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.observation.bytes += data.len() as u64;
                }
            }
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => this.observation.record(),
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
