//! Compute domain
//!
//! Implements `compute.googleapis.com/compute/v1/projects/{p}/zones/{z}/instances`
//! and the adjacent zone, machine-type, and operation resources. Every instance
//! maps to a real container on the host container engine through
//! [`container::ContainerDriver`], with its network interface resolved against
//! `domain_networks`.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ComputeError, ComputeResult};
pub use handlers::ApiDoc;
pub use models::{
    AccessConfig, CreateInstance, Instance, InstanceFilter, InstanceStatus, InstanceView,
    MachineType, NetworkInterfaceSpec, NetworkInterfaceView, Zone,
};
pub use postgres::PgInstanceRepository;
pub use repository::{InMemoryInstanceRepository, InstanceRepository};
pub use service::InstanceService;
