use axum::response::{IntoResponse, Response};
use emulator_errors::{ApiError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("network '{0}' not found")]
    NetworkNotFound(String),
    #[error("subnet '{0}' not found")]
    SubnetNotFound(String),
    #[error("route '{0}' not found")]
    RouteNotFound(String),
    #[error("network '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    FailedPrecondition(String),
    #[error("subnet '{0}' has no remaining addresses")]
    ResourceExhausted(String),
    #[error("container engine unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl IntoResponse for NetworkError {
    fn into_response(self) -> Response {
        let kind = match &self {
            NetworkError::NetworkNotFound(_)
            | NetworkError::SubnetNotFound(_)
            | NetworkError::RouteNotFound(_) => ErrorKind::NotFound,
            NetworkError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            NetworkError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            NetworkError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            NetworkError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            NetworkError::Unavailable(_) => ErrorKind::Unavailable,
            NetworkError::Internal(_) => ErrorKind::Internal,
        };
        ApiError::new(kind, self.to_string()).into_response()
    }
}

impl From<container::ContainerError> for NetworkError {
    fn from(err: container::ContainerError) -> Self {
        match err {
            container::ContainerError::Unavailable(msg) => NetworkError::Unavailable(msg),
            container::ContainerError::NotFound(msg) => NetworkError::NetworkNotFound(msg),
            container::ContainerError::FailedPrecondition(msg) => {
                NetworkError::FailedPrecondition(msg)
            }
            container::ContainerError::Internal(msg) => NetworkError::Internal(msg),
        }
    }
}
