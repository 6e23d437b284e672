//! Wires the cross-domain callbacks each domain crate declares as a trait,
//! so `domain_projects` and `domain_networks` can trigger behavior in sibling
//! domains without depending on their crates directly. This module is the
//! only place in the workspace allowed to see every domain at once.

use std::sync::Arc;

use async_trait::async_trait;
use domain_compute::{InstanceRepository, InstanceService};
use domain_identity::{IdentityService, ServiceAccountRepository};
use domain_networks::{InstanceAttachmentChecker, NetworkRepository, NetworkService};
use domain_projects::{DefaultNetworkEnsurer, ProjectResourceCleaner};
use domain_storage::{StorageRepository, StorageService};

/// Bridges `ProjectService::create_project` to `NetworkService::ensure_default_network`.
pub struct NetworkEnsurer<NR: NetworkRepository> {
    pub networks: Arc<NetworkService<NR>>,
}

#[async_trait]
impl<NR: NetworkRepository + 'static> DefaultNetworkEnsurer for NetworkEnsurer<NR> {
    async fn ensure_default_network(&self, project_id: &str) -> Result<(), String> {
        self.networks
            .ensure_default_network(project_id)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Bridges `NetworkService::delete_network` to a cross-zone instance lookup in
/// `domain_compute`, so a network still backing a running instance is refused.
pub struct InstanceLookup<R: InstanceRepository, NR: NetworkRepository> {
    pub instances: Arc<InstanceService<R, NR>>,
}

#[async_trait]
impl<R: InstanceRepository + 'static, NR: NetworkRepository + 'static> InstanceAttachmentChecker
    for InstanceLookup<R, NR>
{
    async fn has_instances_on_network(&self, project_id: &str, network_name: &str) -> Result<bool, String> {
        self.instances
            .has_instances_on_network(project_id, network_name)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Bridges `ProjectService::delete_project` to every other domain's
/// cascade-delete, so tearing down a project also tears down its instances,
/// networks, buckets and service accounts.
pub struct ResourceCleaner<IR, NR, SR, AR>
where
    IR: InstanceRepository,
    NR: NetworkRepository,
    SR: StorageRepository,
    AR: ServiceAccountRepository,
{
    pub instances: Arc<InstanceService<IR, NR>>,
    pub networks: Arc<NetworkService<NR>>,
    pub storage: Arc<StorageService<SR>>,
    pub identity: Arc<IdentityService<AR>>,
}

#[async_trait]
impl<IR, NR, SR, AR> ProjectResourceCleaner for ResourceCleaner<IR, NR, SR, AR>
where
    IR: InstanceRepository + 'static,
    NR: NetworkRepository + 'static,
    SR: StorageRepository + 'static,
    AR: ServiceAccountRepository + 'static,
{
    async fn delete_all_project_resources(&self, project_id: &str) -> Result<(), String> {
        self.instances
            .delete_all_for_project(project_id)
            .await
            .map_err(|e| e.to_string())?;
        self.networks
            .delete_all_for_project(project_id)
            .await
            .map_err(|e| e.to_string())?;
        self.storage
            .delete_all_for_project(project_id)
            .await
            .map_err(|e| e.to_string())?;
        self.identity
            .delete_by_project(project_id)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
