use std::collections::HashMap;

/// Desired container state, independent of the engine's own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Exited,
    /// The container does not exist on the engine at all (removed externally).
    Missing,
}

/// Everything needed to create a single instance's container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Name of the bridge network to attach to.
    pub network: String,
    /// Static IPv4 address to request on that network, if the network supports it.
    pub static_ip: Option<String>,
    pub labels: HashMap<String, String>,
    pub command: Option<Vec<String>>,
}

/// Result of inspecting a container on the engine.
#[derive(Debug, Clone)]
pub struct ContainerStatus {
    pub state: ContainerState,
    pub network_ip: Option<String>,
}
