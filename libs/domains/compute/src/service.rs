use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use container::{ContainerDriver, ContainerSpec, ContainerState};
use domain_networks::NetworkRepository;

use crate::error::{ComputeError, ComputeResult};
use crate::models::{
    trailing_segment, CreateInstance, Instance, InstanceFilter, InstanceStatus, InstanceView,
    MachineType, Zone,
};
use crate::repository::InstanceRepository;

const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Instance lifecycle and reconciliation against the host container engine.
/// `image` is the single image every instance is created from, since the
/// emulator does not model an image catalog.
#[derive(Clone)]
pub struct InstanceService<R: InstanceRepository, NR: NetworkRepository> {
    repository: Arc<R>,
    networks: Arc<domain_networks::NetworkService<NR>>,
    driver: Arc<dyn ContainerDriver>,
    vendor_prefix: String,
    image: String,
}

impl<R: InstanceRepository, NR: NetworkRepository> InstanceService<R, NR> {
    pub fn new(
        repository: R,
        networks: Arc<domain_networks::NetworkService<NR>>,
        driver: Arc<dyn ContainerDriver>,
        vendor_prefix: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            networks,
            driver,
            vendor_prefix: vendor_prefix.into(),
            image: image.into(),
        }
    }

    pub fn list_zones(&self) -> Vec<Zone> {
        Zone::catalog()
    }

    pub fn get_zone(&self, name: &str) -> ComputeResult<Zone> {
        Zone::catalog()
            .into_iter()
            .find(|z| z.name == name)
            .ok_or_else(|| ComputeError::ZoneNotFound(name.to_string()))
    }

    pub fn list_machine_types(&self, zone: &str) -> Vec<MachineType> {
        MachineType::catalog().into_iter().filter(|m| m.zone == zone).collect()
    }

    pub fn get_machine_type(&self, zone: &str, name: &str) -> ComputeResult<MachineType> {
        MachineType::catalog()
            .into_iter()
            .find(|m| m.zone == zone && m.name == name)
            .ok_or_else(|| ComputeError::MachineTypeNotFound(name.to_string()))
    }

    /// Creates the backing container, allocates network state, and persists the
    /// instance row. Rolls back the container (and, where relevant, the
    /// allocated state) if any later step fails, so a failed create never
    /// leaves an orphaned container running on the host engine.
    pub async fn create_instance(
        &self,
        project_id: &str,
        zone: &str,
        input: CreateInstance,
    ) -> ComputeResult<Instance> {
        input
            .validate()
            .map_err(|e| ComputeError::InvalidArgument(e.to_string()))?;

        self.get_zone(zone)?;
        let machine_type_name = trailing_segment(&input.machine_type);
        self.get_machine_type(zone, machine_type_name)?;

        if self
            .repository
            .get_instance(project_id, zone, &input.name)
            .await?
            .is_some()
        {
            return Err(ComputeError::AlreadyExists(input.name));
        }

        let iface = input.network_interfaces.first();
        let network_name = iface
            .map(|i| trailing_segment(&i.network).to_string())
            .unwrap_or_else(|| "default".to_string());
        let subnet_name = iface.and_then(|i| i.subnetwork.as_deref().map(trailing_segment));

        let network = self.networks.get_network(project_id, &network_name).await?;

        let (subnet_name, internal_ip) = match subnet_name {
            Some(subnet_name) => {
                let region = zone.rsplit_once('-').map(|(r, _)| r).unwrap_or(zone);
                let ip = self.networks.allocate_ip(project_id, region, subnet_name).await?;
                (Some(subnet_name.to_string()), Some(ip))
            }
            None => (None, None),
        };

        let container_name = format!("{}-{}-{}-{}", self.vendor_prefix, project_id, zone, input.name);
        let mut labels = HashMap::new();
        labels.insert("project".to_string(), project_id.to_string());
        labels.insert("zone".to_string(), zone.to_string());
        labels.insert("instance".to_string(), input.name.clone());

        let spec = ContainerSpec {
            name: container_name.clone(),
            image: self.image.clone(),
            network: network.driver_network_id.clone(),
            static_ip: internal_ip.clone(),
            labels,
            command: None,
        };

        let container_id = match self.driver.create_container(spec).await {
            Ok(id) => id,
            Err(err) => {
                self.release_pending_ip(project_id, zone, &subnet_name, &internal_ip).await;
                return Err(err.into());
            }
        };

        if let Err(err) = self.driver.start_container(&container_id).await {
            let _ = self.driver.remove_container(&container_id, true).await;
            self.release_pending_ip(project_id, zone, &subnet_name, &internal_ip).await;
            return Err(err.into());
        }

        let instance = Instance {
            status: InstanceStatus::Running,
            container_id: Some(container_id.clone()),
            internal_ip,
            ..Instance::new(
                project_id,
                zone,
                &input.name,
                machine_type_name,
                &network_name,
                subnet_name.as_deref(),
                &container_name,
            )
        };

        match self.repository.create_instance(instance).await {
            Ok(instance) => Ok(instance),
            Err(err) => {
                let _ = self.driver.remove_container(&container_id, true).await;
                self.release_pending_ip(project_id, zone, &subnet_name, &internal_ip).await;
                Err(err)
            }
        }
    }

    /// Undoes a pending `allocate_ip` reservation after a failed instance
    /// create, so a failed attempt never permanently consumes an address from
    /// the subnet's range. A no-op when no subnet was selected. Failures are
    /// logged, not propagated: the instance-create error is already in flight
    /// and takes priority.
    async fn release_pending_ip(
        &self,
        project_id: &str,
        zone: &str,
        subnet_name: &Option<String>,
        internal_ip: &Option<String>,
    ) {
        let (Some(subnet_name), Some(ip)) = (subnet_name, internal_ip) else {
            return;
        };
        let region = zone.rsplit_once('-').map(|(r, _)| r).unwrap_or(zone);
        if let Err(err) = self.networks.release_ip(project_id, region, subnet_name, ip).await {
            tracing::warn!(
                subnet = %subnet_name,
                ip,
                error = %err,
                "failed to release pending IP allocation after failed instance create"
            );
        }
    }

    /// Fetches the instance and reconciles its status against the engine's
    /// actual container state before returning it.
    pub async fn get_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<Instance> {
        let instance = self
            .repository
            .get_instance(project_id, zone, name)
            .await?
            .ok_or_else(|| ComputeError::InstanceNotFound(name.to_string()))?;
        self.reconcile(instance).await
    }

    pub async fn list_instances(&self, project_id: &str, zone: &str, filter: InstanceFilter) -> ComputeResult<Vec<Instance>> {
        let instances = self.repository.list_instances(project_id, zone, filter).await?;
        let mut reconciled = Vec::with_capacity(instances.len());
        for instance in instances {
            reconciled.push(self.reconcile(instance).await?);
        }
        Ok(reconciled)
    }

    /// Reconciles `instance.status` with the engine's view of its container:
    /// running -> RUNNING, exited -> TERMINATED, missing -> TERMINATED with
    /// `container_id` cleared. An unreachable engine keeps the prior status
    /// rather than flapping the instance to UNKNOWN on a transient outage.
    async fn reconcile(&self, mut instance: Instance) -> ComputeResult<Instance> {
        let Some(container_id) = instance.container_id.clone() else {
            return Ok(instance);
        };

        match self.driver.inspect_container(&container_id).await {
            Ok(status) => {
                let new_status = match status.state {
                    ContainerState::Running => InstanceStatus::Running,
                    ContainerState::Exited => InstanceStatus::Terminated,
                    ContainerState::Missing => InstanceStatus::Terminated,
                };
                let changed = new_status != instance.status
                    || (status.state == ContainerState::Missing && instance.container_id.is_some());
                if changed {
                    instance.status = new_status;
                    if status.state == ContainerState::Missing {
                        instance.container_id = None;
                    }
                    if let Some(ip) = status.network_ip {
                        instance.internal_ip = Some(ip);
                    }
                    instance = self.repository.update_instance(instance).await?;
                }
                Ok(instance)
            }
            Err(container::ContainerError::Unavailable(msg)) => {
                tracing::warn!(instance = %instance.name, error = %msg, "container engine unavailable during reconciliation");
                Ok(instance)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn start_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<Instance> {
        let instance = self.get_instance(project_id, zone, name).await?;
        let Some(container_id) = instance.container_id.clone() else {
            return Err(ComputeError::FailedPrecondition(format!(
                "instance '{name}' has no backing container"
            )));
        };
        self.driver.start_container(&container_id).await?;

        let mut instance = instance;
        instance.status = InstanceStatus::Running;
        self.repository.update_instance(instance).await
    }

    pub async fn stop_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<Instance> {
        let mut instance = self.get_instance(project_id, zone, name).await?;
        let Some(container_id) = instance.container_id.clone() else {
            return Err(ComputeError::FailedPrecondition(format!(
                "instance '{name}' has no backing container"
            )));
        };

        instance.status = InstanceStatus::Stopping;
        instance = self.repository.update_instance(instance).await?;

        self.driver.stop_container(&container_id, STOP_TIMEOUT).await?;

        instance.status = InstanceStatus::Terminated;
        self.repository.update_instance(instance).await
    }

    pub async fn delete_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<()> {
        let instance = self
            .repository
            .get_instance(project_id, zone, name)
            .await?
            .ok_or_else(|| ComputeError::InstanceNotFound(name.to_string()))?;

        if let Some(container_id) = instance.container_id {
            self.driver.remove_container(&container_id, true).await?;
        }

        let deleted = self.repository.delete_instance(project_id, zone, name).await?;
        if !deleted {
            return Err(ComputeError::InstanceNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Whether any instance in the project, in any zone, is attached to the
    /// named network. Used to refuse deleting a network still in use.
    pub async fn has_instances_on_network(&self, project_id: &str, network_name: &str) -> ComputeResult<bool> {
        let instances = self.repository.list_by_network(project_id, network_name).await?;
        Ok(!instances.is_empty())
    }

    /// Tears down every container backing an instance in the project, then
    /// removes the instance rows. Used by project cascade-delete; individual
    /// container removal failures are logged and do not stop the sweep.
    pub async fn delete_all_for_project(&self, project_id: &str) -> ComputeResult<()> {
        let removed = self.repository.delete_all_for_project(project_id).await?;
        for instance in removed {
            if let Some(container_id) = instance.container_id {
                if let Err(err) = self.driver.remove_container(&container_id, true).await {
                    tracing::warn!(
                        instance = %instance.name,
                        container_id,
                        error = %err,
                        "failed to remove container during project cascade-delete"
                    );
                }
            }
        }
        Ok(())
    }
}

pub fn to_view(instance: &Instance) -> InstanceView {
    InstanceView::from_instance(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NetworkInterfaceSpec;
    use crate::repository::InMemoryInstanceRepository;
    use container::MockContainerDriver;
    use domain_networks::{InMemoryNetworkRepository, NetworkService};
    use mockall::predicate::*;

    async fn service_with_driver(
        mut driver: MockContainerDriver,
    ) -> InstanceService<InMemoryInstanceRepository, InMemoryNetworkRepository> {
        driver
            .expect_create_bridge_network()
            .returning(|_, _| Ok("bridge-1".to_string()));
        let networks = NetworkService::new(InMemoryNetworkRepository::new(), Arc::new(driver), "emu");
        networks.ensure_default_network("demo").await.unwrap();

        let mut instance_driver = MockContainerDriver::new();
        instance_driver
            .expect_create_container()
            .returning(|_| Ok("container-1".to_string()));
        instance_driver.expect_start_container().returning(|_| Ok(()));

        InstanceService::new(
            InMemoryInstanceRepository::new(),
            Arc::new(networks),
            Arc::new(instance_driver),
            "emu",
            "emulator/vm:latest",
        )
    }

    #[tokio::test]
    async fn create_instance_persists_running_status() {
        let service = service_with_driver(MockContainerDriver::new()).await;

        let instance = service
            .create_instance(
                "demo",
                "us-central1-a",
                CreateInstance {
                    name: "vm1".to_string(),
                    machine_type: "e2-medium".to_string(),
                    network_interfaces: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(instance.status, InstanceStatus::Running);
        assert_eq!(instance.container_id.as_deref(), Some("container-1"));
    }

    #[tokio::test]
    async fn create_instance_rejects_unknown_machine_type() {
        let service = service_with_driver(MockContainerDriver::new()).await;

        let err = service
            .create_instance(
                "demo",
                "us-central1-a",
                CreateInstance {
                    name: "vm1".to_string(),
                    machine_type: "not-a-real-type".to_string(),
                    network_interfaces: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::MachineTypeNotFound(_)));
    }

    #[tokio::test]
    async fn create_instance_rejects_duplicate_name() {
        let service = service_with_driver(MockContainerDriver::new()).await;
        let input = || CreateInstance {
            name: "vm1".to_string(),
            machine_type: "e2-medium".to_string(),
            network_interfaces: vec![],
        };
        service.create_instance("demo", "us-central1-a", input()).await.unwrap();
        let err = service
            .create_instance("demo", "us-central1-a", input())
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn create_instance_allocates_ip_when_subnet_given() {
        let mut driver = MockContainerDriver::new();
        driver
            .expect_create_bridge_network()
            .returning(|_, _| Ok("bridge-1".to_string()));
        let networks = NetworkService::new(InMemoryNetworkRepository::new(), Arc::new(driver), "emu");
        networks.ensure_default_network("demo").await.unwrap();
        networks
            .create_subnet(
                "demo",
                "us-central1",
                domain_networks::CreateSubnet {
                    name: "sn-a".to_string(),
                    network: "default".to_string(),
                    ip_cidr_range: "10.128.0.0/24".to_string(),
                },
            )
            .await
            .unwrap();

        let mut instance_driver = MockContainerDriver::new();
        instance_driver
            .expect_create_container()
            .with(function(|spec: &ContainerSpec| spec.static_ip.as_deref() == Some("10.128.0.2")))
            .returning(|_| Ok("container-1".to_string()));
        instance_driver.expect_start_container().returning(|_| Ok(()));

        let service = InstanceService::new(
            InMemoryInstanceRepository::new(),
            Arc::new(networks),
            Arc::new(instance_driver),
            "emu",
            "emulator/vm:latest",
        );

        let instance = service
            .create_instance(
                "demo",
                "us-central1-a",
                CreateInstance {
                    name: "vm1".to_string(),
                    machine_type: "e2-medium".to_string(),
                    network_interfaces: vec![NetworkInterfaceSpec {
                        network: "default".to_string(),
                        subnetwork: Some("sn-a".to_string()),
                    }],
                },
            )
            .await
            .unwrap();

        assert_eq!(instance.internal_ip.as_deref(), Some("10.128.0.2"));
    }

    #[tokio::test]
    async fn failed_create_releases_allocated_ip() {
        let mut driver = MockContainerDriver::new();
        driver
            .expect_create_bridge_network()
            .returning(|_, _| Ok("bridge-1".to_string()));
        let networks = NetworkService::new(InMemoryNetworkRepository::new(), Arc::new(driver), "emu");
        networks.ensure_default_network("demo").await.unwrap();
        networks
            .create_subnet(
                "demo",
                "us-central1",
                domain_networks::CreateSubnet {
                    name: "sn-a".to_string(),
                    network: "default".to_string(),
                    ip_cidr_range: "10.128.0.0/24".to_string(),
                },
            )
            .await
            .unwrap();
        let networks = Arc::new(networks);

        let mut failing_driver = MockContainerDriver::new();
        failing_driver
            .expect_create_container()
            .returning(|_| Err(container::ContainerError::Internal("engine exploded".to_string())));

        let service = InstanceService::new(
            InMemoryInstanceRepository::new(),
            networks.clone(),
            Arc::new(failing_driver),
            "emu",
            "emulator/vm:latest",
        );

        service
            .create_instance(
                "demo",
                "us-central1-a",
                CreateInstance {
                    name: "vm1".to_string(),
                    machine_type: "e2-medium".to_string(),
                    network_interfaces: vec![NetworkInterfaceSpec {
                        network: "default".to_string(),
                        subnetwork: Some("sn-a".to_string()),
                    }],
                },
            )
            .await
            .unwrap_err();

        // Had the failed create above not released its allocation, this would
        // return 10.128.0.3 instead of re-handing out the address it tried to use.
        let ip = networks.allocate_ip("demo", "us-central1", "sn-a").await.unwrap();
        assert_eq!(ip, "10.128.0.2");
    }

    #[tokio::test]
    async fn stop_then_start_round_trips_status() {
        let service = service_with_driver(MockContainerDriver::new()).await;
        service
            .create_instance(
                "demo",
                "us-central1-a",
                CreateInstance {
                    name: "vm1".to_string(),
                    machine_type: "e2-medium".to_string(),
                    network_interfaces: vec![],
                },
            )
            .await
            .unwrap();

        // The shared mock driver in `service_with_driver` only stubs create/start,
        // so exercise stop/start against a driver that also stubs those calls.
        let mut driver = MockContainerDriver::new();
        driver.expect_stop_container().returning(|_, _| Ok(()));
        driver.expect_start_container().returning(|_| Ok(()));
        driver.expect_create_bridge_network().returning(|_, _| Ok("bridge-1".to_string()));
        driver.expect_create_container().returning(|_| Ok("container-1".to_string()));

        let networks = NetworkService::new(InMemoryNetworkRepository::new(), Arc::new(MockContainerDriver::new()), "emu");
        networks.ensure_default_network("demo").await.unwrap();
        let repository = InMemoryInstanceRepository::new();
        let service = InstanceService::new(repository, Arc::new(networks), Arc::new(driver), "emu", "emulator/vm:latest");
        service
            .create_instance(
                "demo",
                "us-central1-a",
                CreateInstance {
                    name: "vm2".to_string(),
                    machine_type: "e2-medium".to_string(),
                    network_interfaces: vec![],
                },
            )
            .await
            .unwrap();

        let stopped = service.stop_instance("demo", "us-central1-a", "vm2").await.unwrap();
        assert_eq!(stopped.status, InstanceStatus::Terminated);

        let started = service.start_instance("demo", "us-central1-a", "vm2").await.unwrap();
        assert_eq!(started.status, InstanceStatus::Running);
    }
}
