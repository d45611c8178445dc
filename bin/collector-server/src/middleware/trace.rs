//! Per-request tracing middleware.
//!
//! Extracts the caller-supplied `x-trace-id` header (or generates a fresh
//! UUID), wraps the request in a tracing span, and echoes the id on the
//! response so clients can correlate log lines with their requests.

use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

pub async fn trace_middleware(mut req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("→ request started");

        // A UUID string is always a valid header value.
        req.headers_mut()
            .insert(X_TRACE_ID, trace_id.to_string().parse().unwrap());

        let mut response = next.run(req).await;

        response
            .headers_mut()
            .insert(X_TRACE_ID, trace_id.to_string().parse().unwrap());

        info!(
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}
