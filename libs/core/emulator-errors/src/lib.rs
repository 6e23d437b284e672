//! Shared error envelope for the emulator's HTTP surface.
//!
//! Every domain crate defines its own `thiserror`-derived error enum (following the
//! pattern in `domain_projects::error` and `domain_cloud_resources::error`) and maps
//! each variant to an [`ErrorKind`] here, so the wire shape of an error response is
//! identical no matter which domain produced it: `{ error: { code, message, errors } }`,
//! matching the `storage.v1` error envelope named in the specification.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Internal error classification, independent of any single domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    PathTraversal,
    NotFound,
    AlreadyExists,
    FailedPrecondition,
    ResourceExhausted,
    DeadlineExceeded,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidArgument | ErrorKind::PathTraversal => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists | ErrorKind::FailedPrecondition => StatusCode::CONFLICT,
            ErrorKind::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `reason` string the cloud's clients key error handling off of.
    pub fn reason(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid",
            ErrorKind::PathTraversal => "invalid",
            ErrorKind::NotFound => "notFound",
            ErrorKind::AlreadyExists => "alreadyExists",
            ErrorKind::FailedPrecondition => "failedPrecondition",
            ErrorKind::ResourceExhausted => "resourceExhausted",
            ErrorKind::DeadlineExceeded => "deadlineExceeded",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internalError",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    domain: &'static str,
    reason: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// A ready-to-respond API error: a classification plus a human message.
///
/// Domain error enums implement `IntoResponse` by constructing one of these and
/// delegating, rather than shaping the JSON body themselves.
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status();
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: status.as_u16(),
                message: self.message.clone(),
                errors: vec![ErrorDetail {
                    domain: "global",
                    reason: self.kind.reason(),
                    message: self.message,
                }],
            },
        };
        (status, Json(body)).into_response()
    }
}
