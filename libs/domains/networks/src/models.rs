use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use regex::Regex;

use crate::cidr::Cidr;

static DNS_LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap());

fn validate_dns_label(name: &str) -> Result<(), validator::ValidationError> {
    if !DNS_LABEL_PATTERN.is_match(name) {
        return Err(validator::ValidationError::new("invalid_dns_label"));
    }
    Ok(())
}

/// A VPC network. `default` is reserved: it is created implicitly for every
/// project and can never be deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Network {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub project_id: String,
    pub name: String,
    pub cidr: String,
    pub driver_network_id: String,
    pub auto_create_subnetworks: bool,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNetwork {
    #[validate(custom(function = "validate_dns_label"))]
    pub name: String,
    #[serde(default)]
    pub auto_create_subnetworks: bool,
}

pub const DEFAULT_NETWORK_NAME: &str = "default";
pub const DEFAULT_NETWORK_CIDR: &str = "10.128.0.0/9";

/// Containing range given to every custom (auto-create-off) network. Broad enough
/// for a caller to carve out any private subnet range (e.g. `10.0.0.0/24`) with
/// `create_subnet`, since the cloud leaves subnet allocation entirely to the
/// caller for these networks rather than auto-assigning one like `default` does.
pub const CUSTOM_NETWORK_CIDR: &str = "10.0.0.0/8";

impl Network {
    pub fn new_default(project_id: &str, driver_network_id: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id: project_id.to_string(),
            name: DEFAULT_NETWORK_NAME.to_string(),
            cidr: DEFAULT_NETWORK_CIDR.to_string(),
            driver_network_id: driver_network_id.to_string(),
            auto_create_subnetworks: true,
            create_time: Utc::now(),
        }
    }

    pub fn new(project_id: &str, input: CreateNetwork, cidr: &str, driver_network_id: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id: project_id.to_string(),
            name: input.name,
            cidr: cidr.to_string(),
            driver_network_id: driver_network_id.to_string(),
            auto_create_subnetworks: input.auto_create_subnetworks,
            create_time: Utc::now(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_NETWORK_NAME
    }
}

/// An IP range carved out of a [`Network`]. `next_offset` is the monotonic
/// counter used by [`crate::service::NetworkService::allocate_ip`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subnet {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub project_id: String,
    pub region: String,
    pub network_name: String,
    pub name: String,
    pub cidr: String,
    pub gateway_ip: String,
    pub next_offset: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubnet {
    #[validate(custom(function = "validate_dns_label"))]
    pub name: String,
    pub network: String,
    pub ip_cidr_range: String,
}

impl Subnet {
    pub fn new(project_id: &str, region: &str, input: &CreateSubnet, cidr: &Cidr) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id: project_id.to_string(),
            region: region.to_string(),
            network_name: input.network.clone(),
            name: input.name.clone(),
            cidr: cidr.as_string(),
            gateway_ip: cidr.gateway_address().to_string(),
            next_offset: 2,
        }
    }
}

/// A metadata-only static route; no routing behavior is emulated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Route {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub project_id: String,
    pub name: String,
    pub network: String,
    pub dest_range: String,
    pub next_hop_gateway: String,
    pub priority: i32,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRoute {
    #[validate(custom(function = "validate_dns_label"))]
    pub name: String,
    pub network: String,
    pub dest_range: String,
    #[serde(default = "default_next_hop")]
    pub next_hop_gateway: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_next_hop() -> String {
    "default-internet-gateway".to_string()
}

fn default_priority() -> i32 {
    1000
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoute {
    pub priority: Option<i32>,
    pub next_hop_gateway: Option<String>,
}

impl Route {
    pub fn new(project_id: &str, input: CreateRoute) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id: project_id.to_string(),
            name: input.name,
            network: input.network,
            dest_range: input.dest_range,
            next_hop_gateway: input.next_hop_gateway,
            priority: input.priority,
            create_time: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct NetworkFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for NetworkFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> usize {
    50
}

/// The constant `default-internet-gateway` pseudo-resource: never persisted,
/// identical for every project.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InternetGateway {
    pub name: String,
    pub kind: String,
}

impl InternetGateway {
    pub const NAME: &'static str = "default-internet-gateway";

    pub fn constant() -> Self {
        Self {
            name: Self::NAME.to_string(),
            kind: "compute#internetGateway".to_string(),
        }
    }
}
