//! Cross-cutting request middleware specific to running the combined emulator.

use axum::{extract::Request, http::Method, middleware::Next, response::Response};
use axum_helpers::audit::{AuditEvent, AuditOutcome, extract_ip_from_headers};

/// Logs every mutating request (`POST`/`PUT`/`PATCH`/`DELETE`) as an audit
/// event keyed on its path, once the response status is known. Read-only
/// `GET`/`HEAD` traffic is left alone; it carries no compliance weight here.
pub async fn audit_mutations(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    if !matches!(method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let ip = extract_ip_from_headers(request.headers());

    let response = next.run(request).await;

    let outcome = if response.status().is_success() {
        AuditOutcome::Success
    } else if response.status() == axum::http::StatusCode::FORBIDDEN {
        AuditOutcome::Denied
    } else {
        AuditOutcome::Failure
    };

    AuditEvent::new(None, format!("{method} {path}"), Some(path), outcome)
        .with_ip(ip)
        .log();

    response
}
