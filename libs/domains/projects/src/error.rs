use axum::response::{IntoResponse, Response};
use emulator_errors::{ApiError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project '{0}' not found")]
    NotFound(String),
    #[error("project '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid project: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

impl IntoResponse for ProjectError {
    fn into_response(self) -> Response {
        let kind = match &self {
            ProjectError::NotFound(_) => ErrorKind::NotFound,
            ProjectError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ProjectError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ProjectError::Internal(_) => ErrorKind::Internal,
        };
        ApiError::new(kind, self.to_string()).into_response()
    }
}
