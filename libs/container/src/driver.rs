use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::ContainerResult;
use crate::types::{ContainerSpec, ContainerStatus};

/// Thin wrapper over the host container engine. Every method's post-state is the
/// desired state where possible (start/stop/remove are idempotent), matching the
/// contracts the compute and network services are written against rather than any
/// particular engine's own semantics.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ContainerDriver: Send + Sync {
    /// Creates a bridge network, or returns the id of an existing one with the same
    /// name. Fails `Unavailable` if the engine cannot be reached.
    async fn create_bridge_network(
        &self,
        name: &str,
        labels: HashMap<String, String>,
    ) -> ContainerResult<String>;

    /// Succeeds if the network is already absent. Fails `FailedPrecondition` if
    /// containers are still attached.
    async fn remove_bridge_network(&self, name: &str) -> ContainerResult<()>;

    /// Two-phase create-then-start. On start failure the created container is
    /// removed before the error is returned, so callers never have to clean up a
    /// half-created container themselves.
    async fn create_container(&self, spec: ContainerSpec) -> ContainerResult<String>;

    async fn start_container(&self, id: &str) -> ContainerResult<()>;

    async fn stop_container(&self, id: &str, timeout: Duration) -> ContainerResult<()>;

    async fn remove_container(&self, id: &str, force: bool) -> ContainerResult<()>;

    /// `NotFound`-shaped failures are reported as `ContainerStatus { state: Missing, .. }`
    /// rather than as an error, so reconciliation (see `domain_compute::service`) can
    /// tell "container gone" apart from "engine unreachable".
    async fn inspect_container(&self, id: &str) -> ContainerResult<ContainerStatus>;
}
