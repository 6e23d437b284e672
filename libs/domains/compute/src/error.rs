use axum::response::{IntoResponse, Response};
use emulator_errors::{ApiError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("instance '{0}' not found")]
    InstanceNotFound(String),
    #[error("zone '{0}' not found")]
    ZoneNotFound(String),
    #[error("machine type '{0}' not found")]
    MachineTypeNotFound(String),
    #[error("instance '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    FailedPrecondition(String),
    #[error("container engine unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ComputeResult<T> = Result<T, ComputeError>;

impl IntoResponse for ComputeError {
    fn into_response(self) -> Response {
        let kind = match &self {
            ComputeError::InstanceNotFound(_)
            | ComputeError::ZoneNotFound(_)
            | ComputeError::MachineTypeNotFound(_) => ErrorKind::NotFound,
            ComputeError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ComputeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ComputeError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            ComputeError::Unavailable(_) => ErrorKind::Unavailable,
            ComputeError::Internal(_) => ErrorKind::Internal,
        };
        ApiError::new(kind, self.to_string()).into_response()
    }
}

impl From<container::ContainerError> for ComputeError {
    fn from(err: container::ContainerError) -> Self {
        match err {
            container::ContainerError::Unavailable(msg) => ComputeError::Unavailable(msg),
            container::ContainerError::NotFound(msg) => ComputeError::InstanceNotFound(msg),
            container::ContainerError::FailedPrecondition(msg) => {
                ComputeError::FailedPrecondition(msg)
            }
            container::ContainerError::Internal(msg) => ComputeError::Internal(msg),
        }
    }
}

impl From<domain_networks::NetworkError> for ComputeError {
    fn from(err: domain_networks::NetworkError) -> Self {
        match err {
            domain_networks::NetworkError::NetworkNotFound(msg) => ComputeError::InvalidArgument(
                format!("network not found: {msg}"),
            ),
            domain_networks::NetworkError::SubnetNotFound(msg) => ComputeError::InvalidArgument(
                format!("subnet not found: {msg}"),
            ),
            domain_networks::NetworkError::ResourceExhausted(msg) => {
                ComputeError::FailedPrecondition(format!("subnet '{msg}' exhausted"))
            }
            domain_networks::NetworkError::Unavailable(msg) => ComputeError::Unavailable(msg),
            domain_networks::NetworkError::Internal(msg) => ComputeError::Internal(msg),
            other => ComputeError::InvalidArgument(other.to_string()),
        }
    }
}
