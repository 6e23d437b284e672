//! Network domain
//!
//! Implements `compute.googleapis.com/compute/v1/projects/{p}/global/networks`
//! and the adjacent subnetwork, route, and internet-gateway resources. Every
//! network maps to a bridge on the host container engine through
//! [`container::ContainerDriver`].

pub mod cidr;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use cidr::Cidr;
pub use error::{NetworkError, NetworkResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateNetwork, CreateRoute, CreateSubnet, InternetGateway, Network, NetworkFilter, Route,
    Subnet, UpdateRoute,
};
pub use postgres::PgNetworkRepository;
pub use repository::{InMemoryNetworkRepository, NetworkRepository};
pub use service::{InstanceAttachmentChecker, NetworkService};
