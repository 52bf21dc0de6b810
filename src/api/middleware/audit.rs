//! Audit logging middleware.
//!
//! Logs every API request with a request id, principal, method, path,
//! response status and latency. Runs innermost (after auth has injected
//! the `Principal`).

use std::time::Instant;

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::api::types::Principal;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let subject = req
        .extensions()
        .get::<Principal>()
        .map(|p| p.subject.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    tracing::info!(
        %request_id,
        %subject,
        %method,
        %path,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "API request"
    );

    if let Ok(val) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("X-Request-Id", val);
    }
    response
}
