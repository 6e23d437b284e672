use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use validator::Validate;

use container::ContainerDriver;

use crate::cidr::Cidr;
use crate::error::{NetworkError, NetworkResult};
use crate::models::{
    CreateNetwork, CreateRoute, CreateSubnet, Network, NetworkFilter, Route, Subnet,
    UpdateRoute, CUSTOM_NETWORK_CIDR, DEFAULT_NETWORK_CIDR, DEFAULT_NETWORK_NAME,
};
use crate::repository::NetworkRepository;

/// Queried before a network delete, so a network still referenced by a running
/// instance is refused rather than leaving the instance's container pointed at a
/// bridge that no longer exists. Implemented by the composition root over
/// `domain_compute`, to avoid this crate depending on it for a single call.
#[async_trait]
pub trait InstanceAttachmentChecker: Send + Sync {
    async fn has_instances_on_network(&self, project_id: &str, network_name: &str) -> Result<bool, String>;
}

/// VPC/subnet/route business logic. `vendor_prefix` names engine bridges
/// `{vendor_prefix}-{project}-{network}`, matching the cloud's convention for
/// naming driver-level resources it creates on a user's behalf.
#[derive(Clone)]
pub struct NetworkService<R: NetworkRepository> {
    instance_checker: Option<Arc<dyn InstanceAttachmentChecker>>,
    repository: Arc<R>,
    driver: Arc<dyn ContainerDriver>,
    vendor_prefix: String,
}

impl<R: NetworkRepository> NetworkService<R> {
    pub fn new(repository: R, driver: Arc<dyn ContainerDriver>, vendor_prefix: impl Into<String>) -> Self {
        Self {
            instance_checker: None,
            repository: Arc::new(repository),
            driver,
            vendor_prefix: vendor_prefix.into(),
        }
    }

    /// Wires in the cross-domain instance-attachment check used by [`Self::delete_network`].
    /// Without this, network deletion only guards against attached subnets.
    pub fn with_instance_checker(mut self, checker: Arc<dyn InstanceAttachmentChecker>) -> Self {
        self.instance_checker = Some(checker);
        self
    }

    /// Idempotently ensures the project's `default` network row exists, mapped to
    /// the engine's built-in bridge rather than a freshly created one.
    pub async fn ensure_default_network(&self, project_id: &str) -> NetworkResult<Network> {
        if let Some(existing) = self.repository.get_network(project_id, DEFAULT_NETWORK_NAME).await? {
            return Ok(existing);
        }

        let network = Network::new_default(project_id, "bridge");
        match self.repository.create_network(network).await {
            Ok(network) => Ok(network),
            Err(NetworkError::AlreadyExists(_)) => {
                // Lost a race with a concurrent caller; the row now exists.
                self.repository
                    .get_network(project_id, DEFAULT_NETWORK_NAME)
                    .await?
                    .ok_or_else(|| NetworkError::Internal("default network vanished after race".into()))
            }
            Err(other) => Err(other),
        }
    }

    pub async fn create_network(&self, project_id: &str, input: CreateNetwork) -> NetworkResult<Network> {
        input
            .validate()
            .map_err(|e| NetworkError::InvalidArgument(e.to_string()))?;

        if input.name == DEFAULT_NETWORK_NAME {
            return Err(NetworkError::InvalidArgument(
                "the name 'default' is reserved".to_string(),
            ));
        }
        if self.repository.get_network(project_id, &input.name).await?.is_some() {
            return Err(NetworkError::AlreadyExists(input.name));
        }

        let bridge_name = format!("{}-{}-{}", self.vendor_prefix, project_id, input.name);
        let mut labels = HashMap::new();
        labels.insert("project".to_string(), project_id.to_string());
        labels.insert("network".to_string(), input.name.clone());

        let driver_network_id = self
            .driver
            .create_bridge_network(&bridge_name, labels)
            .await?;

        // Custom (auto-create-off) VPCs get one fixed, broad containing range;
        // the cloud itself leaves subnet ranges entirely to the caller for these,
        // so the range only needs to be wide enough to contain whatever the
        // caller passes to `create_subnet` afterwards.
        let network = Network::new(project_id, input, CUSTOM_NETWORK_CIDR, &driver_network_id);

        match self.repository.create_network(network).await {
            Ok(network) => Ok(network),
            Err(err) => {
                let _ = self.driver.remove_bridge_network(&bridge_name).await;
                Err(err)
            }
        }
    }

    pub async fn get_network(&self, project_id: &str, name: &str) -> NetworkResult<Network> {
        self.repository
            .get_network(project_id, name)
            .await?
            .ok_or_else(|| NetworkError::NetworkNotFound(name.to_string()))
    }

    pub async fn list_networks(&self, project_id: &str, filter: NetworkFilter) -> NetworkResult<Vec<Network>> {
        self.repository.list_networks(project_id, filter).await
    }

    pub async fn delete_network(&self, project_id: &str, name: &str) -> NetworkResult<()> {
        if name == DEFAULT_NETWORK_NAME {
            return Err(NetworkError::FailedPrecondition(
                "the 'default' network cannot be deleted".to_string(),
            ));
        }

        let network = self.get_network(project_id, name).await?;

        let attached_subnets = self.repository.list_subnets_for_network(project_id, name).await?;
        if !attached_subnets.is_empty() {
            return Err(NetworkError::FailedPrecondition(format!(
                "network '{name}' still has attached subnetworks"
            )));
        }

        if let Some(checker) = &self.instance_checker {
            let has_instances = checker
                .has_instances_on_network(project_id, name)
                .await
                .map_err(NetworkError::Internal)?;
            if has_instances {
                return Err(NetworkError::FailedPrecondition(format!(
                    "network '{name}' still has attached instances"
                )));
            }
        }

        self.driver.remove_bridge_network(&network.driver_network_id).await?;

        let deleted = self.repository.delete_network(project_id, name).await?;
        if !deleted {
            return Err(NetworkError::NetworkNotFound(name.to_string()));
        }
        Ok(())
    }

    pub async fn create_subnet(
        &self,
        project_id: &str,
        region: &str,
        input: CreateSubnet,
    ) -> NetworkResult<Subnet> {
        input
            .validate()
            .map_err(|e| NetworkError::InvalidArgument(e.to_string()))?;

        let network = self.get_network(project_id, &input.network).await?;
        let network_cidr = Cidr::parse(&network.cidr).map_err(NetworkError::InvalidArgument)?;
        let candidate = Cidr::parse(&input.ip_cidr_range).map_err(NetworkError::InvalidArgument)?;

        if !candidate.is_contained_in(&network_cidr) {
            return Err(NetworkError::FailedPrecondition(format!(
                "{} is not contained in network '{}' ({})",
                input.ip_cidr_range, network.name, network.cidr
            )));
        }

        let siblings = self
            .repository
            .list_subnets_for_network(project_id, &input.network)
            .await?;
        for sibling in &siblings {
            let sibling_cidr = Cidr::parse(&sibling.cidr).map_err(NetworkError::Internal)?;
            if candidate.overlaps(&sibling_cidr) {
                return Err(NetworkError::FailedPrecondition(format!(
                    "{} overlaps existing subnetwork '{}' ({})",
                    input.ip_cidr_range, sibling.name, sibling.cidr
                )));
            }
        }

        if self.repository.get_subnet(project_id, region, &input.name).await?.is_some() {
            return Err(NetworkError::AlreadyExists(input.name));
        }

        let subnet = Subnet::new(project_id, region, &input, &candidate);
        self.repository.create_subnet(subnet).await
    }

    pub async fn get_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<Subnet> {
        self.repository
            .get_subnet(project_id, region, name)
            .await?
            .ok_or_else(|| NetworkError::SubnetNotFound(name.to_string()))
    }

    pub async fn list_subnets(&self, project_id: &str, region: &str) -> NetworkResult<Vec<Subnet>> {
        self.repository.list_subnets(project_id, region).await
    }

    pub async fn delete_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<()> {
        let deleted = self.repository.delete_subnet(project_id, region, name).await?;
        if !deleted {
            return Err(NetworkError::SubnetNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Atomically consumes the next address in `subnet` and returns its dotted form.
    pub async fn allocate_ip(&self, project_id: &str, region: &str, subnet_name: &str) -> NetworkResult<String> {
        let subnet = self.get_subnet(project_id, region, subnet_name).await?;
        let cidr = Cidr::parse(&subnet.cidr).map_err(NetworkError::InvalidArgument)?;

        let offset = self.repository.allocate_ip(subnet.id).await?;
        let ip = cidr
            .address_at(offset as u64)
            .ok_or_else(|| NetworkError::ResourceExhausted(subnet_name.to_string()))?;
        Ok(ip.to_string())
    }

    /// Releases an IP previously returned by [`Self::allocate_ip`] back to the
    /// subnet. Used to roll back a pending allocation when the instance create
    /// that consumed it fails before the IP is ever exposed to a client.
    pub async fn release_ip(&self, project_id: &str, region: &str, subnet_name: &str, ip: &str) -> NetworkResult<()> {
        let subnet = self.get_subnet(project_id, region, subnet_name).await?;
        let cidr = Cidr::parse(&subnet.cidr).map_err(NetworkError::InvalidArgument)?;

        let addr: std::net::Ipv4Addr = ip
            .parse()
            .map_err(|_| NetworkError::InvalidArgument(format!("'{ip}' is not a valid IPv4 address")))?;
        let offset = cidr
            .offset_of(addr)
            .ok_or_else(|| NetworkError::InvalidArgument(format!("'{ip}' is outside subnet '{subnet_name}'")))?;

        self.repository.release_ip(subnet.id, offset as i64).await
    }

    pub async fn create_route(&self, project_id: &str, input: CreateRoute) -> NetworkResult<Route> {
        input
            .validate()
            .map_err(|e| NetworkError::InvalidArgument(e.to_string()))?;

        if self.repository.get_route(project_id, &input.name).await?.is_some() {
            return Err(NetworkError::AlreadyExists(input.name));
        }

        let route = Route::new(project_id, input);
        self.repository.create_route(route).await
    }

    pub async fn get_route(&self, project_id: &str, name: &str) -> NetworkResult<Route> {
        self.repository
            .get_route(project_id, name)
            .await?
            .ok_or_else(|| NetworkError::RouteNotFound(name.to_string()))
    }

    pub async fn list_routes(&self, project_id: &str) -> NetworkResult<Vec<Route>> {
        self.repository.list_routes(project_id).await
    }

    pub async fn update_route(&self, project_id: &str, name: &str, input: UpdateRoute) -> NetworkResult<Route> {
        let mut route = self.get_route(project_id, name).await?;
        if let Some(priority) = input.priority {
            route.priority = priority;
        }
        if let Some(next_hop) = input.next_hop_gateway {
            route.next_hop_gateway = next_hop;
        }
        self.repository.update_route(route).await
    }

    pub async fn delete_route(&self, project_id: &str, name: &str) -> NetworkResult<()> {
        let deleted = self.repository.delete_route(project_id, name).await?;
        if !deleted {
            return Err(NetworkError::RouteNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Tears down every bridge backing a custom network in the project, then
    /// removes the network/subnet/route rows. Used by project cascade-delete;
    /// individual bridge removal failures are logged and do not stop the sweep.
    pub async fn delete_all_for_project(&self, project_id: &str) -> NetworkResult<()> {
        let removed = self.repository.delete_all_for_project(project_id).await?;
        for network in removed {
            if network.name == DEFAULT_NETWORK_NAME {
                continue;
            }
            if let Err(err) = self.driver.remove_bridge_network(&network.driver_network_id).await {
                tracing::warn!(
                    network = %network.name,
                    error = %err,
                    "failed to remove bridge during project cascade-delete"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryNetworkRepository;
    use container::MockContainerDriver;
    use mockall::predicate::*;

    fn service_with_driver(driver: MockContainerDriver) -> NetworkService<InMemoryNetworkRepository> {
        NetworkService::new(InMemoryNetworkRepository::new(), Arc::new(driver), "emu")
    }

    #[tokio::test]
    async fn ensure_default_network_is_idempotent() {
        let driver = MockContainerDriver::new();
        let service = service_with_driver(driver);

        let first = service.ensure_default_network("demo").await.unwrap();
        let second = service.ensure_default_network("demo").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.cidr, DEFAULT_NETWORK_CIDR);
    }

    #[tokio::test]
    async fn create_network_calls_driver_and_persists() {
        let mut driver = MockContainerDriver::new();
        driver
            .expect_create_bridge_network()
            .with(eq("emu-demo-vpc-a"), always())
            .returning(|_, _| Ok("bridge-1".to_string()));
        let service = service_with_driver(driver);

        let network = service
            .create_network(
                "demo",
                CreateNetwork {
                    name: "vpc-a".to_string(),
                    auto_create_subnetworks: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(network.driver_network_id, "bridge-1");
    }

    #[tokio::test]
    async fn create_network_rejects_reserved_name() {
        let service = service_with_driver(MockContainerDriver::new());
        let err = service
            .create_network(
                "demo",
                CreateNetwork {
                    name: DEFAULT_NETWORK_NAME.to_string(),
                    auto_create_subnetworks: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn delete_network_rejects_default() {
        let service = service_with_driver(MockContainerDriver::new());
        service.ensure_default_network("demo").await.unwrap();

        let err = service.delete_network("demo", DEFAULT_NETWORK_NAME).await.unwrap_err();
        assert!(matches!(err, NetworkError::FailedPrecondition(_)));
    }

    #[tokio::test]
    async fn create_subnet_validates_containment() {
        let mut driver = MockContainerDriver::new();
        driver
            .expect_create_bridge_network()
            .returning(|_, _| Ok("bridge-1".to_string()));
        let service = service_with_driver(driver);
        service.ensure_default_network("demo").await.unwrap();

        let err = service
            .create_subnet(
                "demo",
                "us-central1",
                CreateSubnet {
                    name: "sn-a".to_string(),
                    network: DEFAULT_NETWORK_NAME.to_string(),
                    ip_cidr_range: "192.168.0.0/24".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::FailedPrecondition(_)));
    }

    #[tokio::test]
    async fn create_subnet_rejects_sibling_overlap() {
        let service = service_with_driver(MockContainerDriver::new());
        service.ensure_default_network("demo").await.unwrap();

        service
            .create_subnet(
                "demo",
                "us-central1",
                CreateSubnet {
                    name: "sn-a".to_string(),
                    network: DEFAULT_NETWORK_NAME.to_string(),
                    ip_cidr_range: "10.128.0.0/24".to_string(),
                },
            )
            .await
            .unwrap();

        let err = service
            .create_subnet(
                "demo",
                "us-central1",
                CreateSubnet {
                    name: "sn-b".to_string(),
                    network: DEFAULT_NETWORK_NAME.to_string(),
                    ip_cidr_range: "10.128.0.128/25".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::FailedPrecondition(_)));
    }

    #[tokio::test]
    async fn allocate_ip_returns_dotted_address() {
        let service = service_with_driver(MockContainerDriver::new());
        service.ensure_default_network("demo").await.unwrap();
        service
            .create_subnet(
                "demo",
                "us-central1",
                CreateSubnet {
                    name: "sn-a".to_string(),
                    network: DEFAULT_NETWORK_NAME.to_string(),
                    ip_cidr_range: "10.128.0.0/24".to_string(),
                },
            )
            .await
            .unwrap();

        let ip = service.allocate_ip("demo", "us-central1", "sn-a").await.unwrap();
        assert_eq!(ip, "10.128.0.2");
    }

    #[tokio::test]
    async fn custom_network_accepts_caller_chosen_subnet_range() {
        let mut driver = MockContainerDriver::new();
        driver
            .expect_create_bridge_network()
            .returning(|_, _| Ok("bridge-1".to_string()));
        let service = service_with_driver(driver);

        service
            .create_network(
                "demo",
                CreateNetwork {
                    name: "vpc-a".to_string(),
                    auto_create_subnetworks: false,
                },
            )
            .await
            .unwrap();

        let subnet = service
            .create_subnet(
                "demo",
                "us-central1",
                CreateSubnet {
                    name: "sn-a".to_string(),
                    network: "vpc-a".to_string(),
                    ip_cidr_range: "10.0.0.0/24".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(subnet.cidr, "10.0.0.0/24");

        let ip = service.allocate_ip("demo", "us-central1", "sn-a").await.unwrap();
        assert_eq!(ip, "10.0.0.2");
    }
}
