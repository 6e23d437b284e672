use axum::response::{IntoResponse, Response};
use emulator_errors::{ApiError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("service account '{0}' not found")]
    NotFound(String),
    #[error("service account '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid service account: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let kind = match &self {
            IdentityError::NotFound(_) => ErrorKind::NotFound,
            IdentityError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            IdentityError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            IdentityError::Internal(_) => ErrorKind::Internal,
        };
        ApiError::new(kind, self.to_string()).into_response()
    }
}
