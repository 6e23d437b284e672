use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NetworkError, NetworkResult};
use crate::models::{Network, NetworkFilter, Route, Subnet};

#[async_trait]
pub trait NetworkRepository: Send + Sync {
    async fn create_network(&self, network: Network) -> NetworkResult<Network>;
    async fn get_network(&self, project_id: &str, name: &str) -> NetworkResult<Option<Network>>;
    async fn list_networks(&self, project_id: &str, filter: NetworkFilter) -> NetworkResult<Vec<Network>>;
    async fn delete_network(&self, project_id: &str, name: &str) -> NetworkResult<bool>;

    async fn create_subnet(&self, subnet: Subnet) -> NetworkResult<Subnet>;
    async fn get_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<Option<Subnet>>;
    async fn list_subnets(&self, project_id: &str, region: &str) -> NetworkResult<Vec<Subnet>>;
    async fn list_subnets_for_network(&self, project_id: &str, network_name: &str) -> NetworkResult<Vec<Subnet>>;
    async fn delete_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<bool>;

    /// Atomically consumes the next IP offset in `subnet` and returns it.
    /// Implementations must serialize concurrent callers on the same subnet.
    async fn allocate_ip(&self, subnet_id: Uuid) -> NetworkResult<i64>;

    /// Rewinds `next_offset` back to `offset`, undoing a prior `allocate_ip`
    /// call whose instance create failed before the IP was ever exposed to a
    /// client. Only takes effect when `next_offset` is still exactly
    /// `offset + 1` (no later allocation has already consumed past it), so a
    /// released offset is never handed out twice and is a no-op otherwise.
    async fn release_ip(&self, subnet_id: Uuid, offset: i64) -> NetworkResult<()>;

    async fn create_route(&self, route: Route) -> NetworkResult<Route>;
    async fn get_route(&self, project_id: &str, name: &str) -> NetworkResult<Option<Route>>;
    async fn list_routes(&self, project_id: &str) -> NetworkResult<Vec<Route>>;
    async fn update_route(&self, route: Route) -> NetworkResult<Route>;
    async fn delete_route(&self, project_id: &str, name: &str) -> NetworkResult<bool>;

    /// Deletes every network, subnet and route owned by a project, returning
    /// the removed networks so callers can tear down their bridges. Used by
    /// project cascade-delete.
    async fn delete_all_for_project(&self, project_id: &str) -> NetworkResult<Vec<Network>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryNetworkRepository {
    networks: Arc<RwLock<HashMap<(String, String), Network>>>,
    subnets: Arc<RwLock<HashMap<(String, String, String), Subnet>>>,
    routes: Arc<RwLock<HashMap<(String, String), Route>>>,
}

impl InMemoryNetworkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NetworkRepository for InMemoryNetworkRepository {
    async fn create_network(&self, network: Network) -> NetworkResult<Network> {
        let mut networks = self.networks.write().await;
        let key = (network.project_id.clone(), network.name.clone());
        if networks.contains_key(&key) {
            return Err(NetworkError::AlreadyExists(network.name));
        }
        networks.insert(key, network.clone());
        Ok(network)
    }

    async fn get_network(&self, project_id: &str, name: &str) -> NetworkResult<Option<Network>> {
        let networks = self.networks.read().await;
        Ok(networks.get(&(project_id.to_string(), name.to_string())).cloned())
    }

    async fn list_networks(&self, project_id: &str, filter: NetworkFilter) -> NetworkResult<Vec<Network>> {
        let networks = self.networks.read().await;
        let mut result: Vec<Network> = networks
            .values()
            .filter(|n| n.project_id == project_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result.into_iter().skip(filter.offset).take(filter.limit).collect())
    }

    async fn delete_network(&self, project_id: &str, name: &str) -> NetworkResult<bool> {
        let mut networks = self.networks.write().await;
        Ok(networks.remove(&(project_id.to_string(), name.to_string())).is_some())
    }

    async fn create_subnet(&self, subnet: Subnet) -> NetworkResult<Subnet> {
        let mut subnets = self.subnets.write().await;
        let key = (subnet.project_id.clone(), subnet.region.clone(), subnet.name.clone());
        if subnets.contains_key(&key) {
            return Err(NetworkError::AlreadyExists(subnet.name));
        }
        subnets.insert(key, subnet.clone());
        Ok(subnet)
    }

    async fn get_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<Option<Subnet>> {
        let subnets = self.subnets.read().await;
        Ok(subnets
            .get(&(project_id.to_string(), region.to_string(), name.to_string()))
            .cloned())
    }

    async fn list_subnets(&self, project_id: &str, region: &str) -> NetworkResult<Vec<Subnet>> {
        let subnets = self.subnets.read().await;
        let mut result: Vec<Subnet> = subnets
            .values()
            .filter(|s| s.project_id == project_id && s.region == region)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn list_subnets_for_network(&self, project_id: &str, network_name: &str) -> NetworkResult<Vec<Subnet>> {
        let subnets = self.subnets.read().await;
        Ok(subnets
            .values()
            .filter(|s| s.project_id == project_id && s.network_name == network_name)
            .cloned()
            .collect())
    }

    async fn delete_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<bool> {
        let mut subnets = self.subnets.write().await;
        Ok(subnets
            .remove(&(project_id.to_string(), region.to_string(), name.to_string()))
            .is_some())
    }

    async fn allocate_ip(&self, subnet_id: Uuid) -> NetworkResult<i64> {
        let mut subnets = self.subnets.write().await;
        let subnet = subnets
            .values_mut()
            .find(|s| s.id == subnet_id)
            .ok_or_else(|| NetworkError::SubnetNotFound(subnet_id.to_string()))?;

        let cidr = crate::cidr::Cidr::parse(&subnet.cidr)
            .map_err(NetworkError::InvalidArgument)?;
        if subnet.next_offset as u64 >= cidr.size() {
            return Err(NetworkError::ResourceExhausted(subnet.name.clone()));
        }

        let offset = subnet.next_offset;
        subnet.next_offset += 1;
        Ok(offset)
    }

    async fn release_ip(&self, subnet_id: Uuid, offset: i64) -> NetworkResult<()> {
        let mut subnets = self.subnets.write().await;
        if let Some(subnet) = subnets.values_mut().find(|s| s.id == subnet_id) {
            if subnet.next_offset == offset + 1 {
                subnet.next_offset = offset;
            }
        }
        Ok(())
    }

    async fn create_route(&self, route: Route) -> NetworkResult<Route> {
        let mut routes = self.routes.write().await;
        let key = (route.project_id.clone(), route.name.clone());
        if routes.contains_key(&key) {
            return Err(NetworkError::AlreadyExists(route.name));
        }
        routes.insert(key, route.clone());
        Ok(route)
    }

    async fn get_route(&self, project_id: &str, name: &str) -> NetworkResult<Option<Route>> {
        let routes = self.routes.read().await;
        Ok(routes.get(&(project_id.to_string(), name.to_string())).cloned())
    }

    async fn list_routes(&self, project_id: &str) -> NetworkResult<Vec<Route>> {
        let routes = self.routes.read().await;
        let mut result: Vec<Route> = routes
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn update_route(&self, route: Route) -> NetworkResult<Route> {
        let mut routes = self.routes.write().await;
        let key = (route.project_id.clone(), route.name.clone());
        if !routes.contains_key(&key) {
            return Err(NetworkError::RouteNotFound(route.name));
        }
        routes.insert(key, route.clone());
        Ok(route)
    }

    async fn delete_route(&self, project_id: &str, name: &str) -> NetworkResult<bool> {
        let mut routes = self.routes.write().await;
        Ok(routes.remove(&(project_id.to_string(), name.to_string())).is_some())
    }

    async fn delete_all_for_project(&self, project_id: &str) -> NetworkResult<Vec<Network>> {
        let mut routes = self.routes.write().await;
        routes.retain(|_, r| r.project_id != project_id);
        drop(routes);

        let mut subnets = self.subnets.write().await;
        subnets.retain(|_, s| s.project_id != project_id);
        drop(subnets);

        let mut networks = self.networks.write().await;
        let removed: Vec<Network> = networks
            .values()
            .filter(|n| n.project_id == project_id)
            .cloned()
            .collect();
        networks.retain(|_, n| n.project_id != project_id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cidr::Cidr;
    use crate::models::{CreateSubnet, DEFAULT_NETWORK_CIDR, DEFAULT_NETWORK_NAME};

    fn default_network(project_id: &str) -> Network {
        Network::new_default(project_id, "bridge")
    }

    #[tokio::test]
    async fn create_and_get_network_round_trips() {
        let repo = InMemoryNetworkRepository::new();
        let network = default_network("demo");
        repo.create_network(network.clone()).await.unwrap();

        let fetched = repo.get_network("demo", DEFAULT_NETWORK_NAME).await.unwrap();
        assert_eq!(fetched.unwrap().cidr, DEFAULT_NETWORK_CIDR);
    }

    #[tokio::test]
    async fn duplicate_network_name_rejected() {
        let repo = InMemoryNetworkRepository::new();
        repo.create_network(default_network("demo")).await.unwrap();

        let err = repo.create_network(default_network("demo")).await.unwrap_err();
        assert!(matches!(err, NetworkError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn allocate_ip_increments_and_exhausts() {
        let repo = InMemoryNetworkRepository::new();
        let cidr = Cidr::parse("10.0.0.0/30").unwrap();
        let subnet = Subnet::new(
            "demo",
            "us-central1",
            &CreateSubnet {
                name: "sn-a".to_string(),
                network: "default".to_string(),
                ip_cidr_range: "10.0.0.0/30".to_string(),
            },
            &cidr,
        );
        let subnet_id = subnet.id;
        repo.create_subnet(subnet).await.unwrap();

        let first = repo.allocate_ip(subnet_id).await.unwrap();
        assert_eq!(first, 2);
        let second = repo.allocate_ip(subnet_id).await.unwrap();
        assert_eq!(second, 3);

        let err = repo.allocate_ip(subnet_id).await.unwrap_err();
        assert!(matches!(err, NetworkError::ResourceExhausted(_)));
    }

    #[tokio::test]
    async fn delete_all_for_project_clears_networks_subnets_and_routes() {
        let repo = InMemoryNetworkRepository::new();
        repo.create_network(default_network("demo")).await.unwrap();
        repo.create_network(default_network("other")).await.unwrap();

        repo.delete_all_for_project("demo").await.unwrap();

        assert!(repo.get_network("demo", DEFAULT_NETWORK_NAME).await.unwrap().is_none());
        assert!(repo.get_network("other", DEFAULT_NETWORK_NAME).await.unwrap().is_some());
    }
}
