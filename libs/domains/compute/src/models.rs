use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use regex::Regex;

static DNS_LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap());

fn validate_dns_label(name: &str) -> Result<(), validator::ValidationError> {
    if !DNS_LABEL_PATTERN.is_match(name) {
        return Err(validator::ValidationError::new("invalid_dns_label"));
    }
    Ok(())
}

/// A region/zone pair in the static catalog seeded at startup.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Zone {
    pub name: String,
    pub region: String,
}

impl Zone {
    pub fn catalog() -> Vec<Zone> {
        vec![
            Zone { name: "us-central1-a".to_string(), region: "us-central1".to_string() },
            Zone { name: "us-central1-b".to_string(), region: "us-central1".to_string() },
            Zone { name: "europe-west1-b".to_string(), region: "europe-west1".to_string() },
        ]
    }
}

/// A machine shape in the static catalog seeded at startup, scoped to a zone.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MachineType {
    pub name: String,
    pub zone: String,
    pub guest_cpus: u32,
    pub memory_mb: u32,
}

impl MachineType {
    pub fn catalog() -> Vec<MachineType> {
        let mut types = Vec::new();
        for zone in Zone::catalog() {
            types.push(MachineType {
                name: "e2-micro".to_string(),
                zone: zone.name.clone(),
                guest_cpus: 1,
                memory_mb: 1024,
            });
            types.push(MachineType {
                name: "e2-medium".to_string(),
                zone: zone.name.clone(),
                guest_cpus: 2,
                memory_mb: 4096,
            });
            types.push(MachineType {
                name: "e2-standard-4".to_string(),
                zone: zone.name,
                guest_cpus: 4,
                memory_mb: 16384,
            });
        }
        types
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceStatus {
    Provisioning,
    Running,
    Stopping,
    Terminated,
    Unknown,
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InstanceStatus::Provisioning => "PROVISIONING",
            InstanceStatus::Running => "RUNNING",
            InstanceStatus::Stopping => "STOPPING",
            InstanceStatus::Terminated => "TERMINATED",
            InstanceStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// A virtual-machine instance backed by a real container on the host engine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Instance {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub project_id: String,
    pub zone: String,
    pub name: String,
    pub machine_type: String,
    pub status: InstanceStatus,
    pub container_id: Option<String>,
    pub container_name: String,
    pub network_name: String,
    pub subnet_name: Option<String>,
    pub internal_ip: Option<String>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NetworkInterfaceSpec {
    /// Full or relative network resource URL; only the trailing name is used.
    pub network: String,
    pub subnetwork: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInstance {
    #[validate(custom(function = "validate_dns_label"))]
    pub name: String,
    /// Full or relative machine-type resource URL; only the trailing name is used.
    pub machine_type: String,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterfaceSpec>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub nat_ip: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NetworkInterfaceView {
    pub network: String,
    pub subnetwork: Option<String>,
    pub network_ip: Option<String>,
    pub access_configs: Vec<AccessConfig>,
}

/// The response shape clients see, which folds the bare `Instance` row together
/// with its (possibly reconciled) network-interface view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstanceView {
    pub name: String,
    pub zone: String,
    pub machine_type: String,
    pub status: InstanceStatus,
    pub network_interfaces: Vec<NetworkInterfaceView>,
    pub create_time: DateTime<Utc>,
}

impl InstanceView {
    pub fn from_instance(instance: &Instance) -> Self {
        let access_configs = vec![AccessConfig {
            kind: "ONE_TO_ONE_NAT".to_string(),
            nat_ip: "127.0.0.1".to_string(),
        }];

        Self {
            name: instance.name.clone(),
            zone: instance.zone.clone(),
            machine_type: instance.machine_type.clone(),
            status: instance.status,
            network_interfaces: vec![NetworkInterfaceView {
                network: instance.network_name.clone(),
                subnetwork: instance.subnet_name.clone(),
                network_ip: instance.internal_ip.clone(),
                access_configs,
            }],
            create_time: instance.create_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct InstanceFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for InstanceFilter {
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

/// Extracts the trailing path segment of a resource URL, tolerating either a
/// bare name (`e2-medium`) or a full reference
/// (`.../zones/us-central1-a/machineTypes/e2-medium`).
pub fn trailing_segment(resource_ref: &str) -> &str {
    resource_ref.rsplit('/').next().unwrap_or(resource_ref)
}

impl Instance {
    pub fn new(
        project_id: &str,
        zone: &str,
        name: &str,
        machine_type: &str,
        network_name: &str,
        subnet_name: Option<&str>,
        container_name: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            project_id: project_id.to_string(),
            zone: zone.to_string(),
            name: name.to_string(),
            machine_type: machine_type.to_string(),
            status: InstanceStatus::Provisioning,
            container_id: None,
            container_name: container_name.to_string(),
            network_name: network_name.to_string(),
            subnet_name: subnet_name.map(str::to_string),
            internal_ip: None,
            create_time: now,
            update_time: now,
        }
    }
}
