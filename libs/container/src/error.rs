/// Classification of container-engine failures, independent of any HTTP mapping;
/// domain crates translate these into their own error enums (see
/// `domain_compute::error::ComputeError`, `domain_networks::error::NetworkError`).
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container engine unreachable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("precondition failed: {0}")]
    FailedPrecondition(String),
    #[error("container engine error: {0}")]
    Internal(String),
}

pub type ContainerResult<T> = Result<T, ContainerError>;
