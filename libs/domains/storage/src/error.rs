use axum::response::{IntoResponse, Response};
use emulator_errors::{ApiError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("bucket '{0}' not found")]
    BucketNotFound(String),
    #[error("object '{0}' not found")]
    ObjectNotFound(String),
    #[error("signed URL not found or expired")]
    SignedUrlNotFound,
    #[error("bucket '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("path traversal rejected: {0}")]
    PathTraversal(String),
    #[error("{0}")]
    FailedPrecondition(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        let kind = match &self {
            StorageError::BucketNotFound(_)
            | StorageError::ObjectNotFound(_)
            | StorageError::SignedUrlNotFound => ErrorKind::NotFound,
            StorageError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StorageError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StorageError::PathTraversal(_) => ErrorKind::PathTraversal,
            StorageError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            StorageError::Internal(_) => ErrorKind::Internal,
        };
        ApiError::new(kind, self.to_string()).into_response()
    }
}
