use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ComputeError, ComputeResult};
use crate::models::{Instance, InstanceFilter};

#[async_trait]
pub trait InstanceRepository: Send + Sync {
    async fn create_instance(&self, instance: Instance) -> ComputeResult<Instance>;
    async fn get_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<Option<Instance>>;
    async fn list_instances(&self, project_id: &str, zone: &str, filter: InstanceFilter) -> ComputeResult<Vec<Instance>>;
    async fn update_instance(&self, instance: Instance) -> ComputeResult<Instance>;
    async fn delete_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<bool>;

    /// Deletes every instance owned by a project, across all zones, returning the
    /// removed rows so callers can tear down their backing containers. Used by
    /// project cascade-delete.
    async fn delete_all_for_project(&self, project_id: &str) -> ComputeResult<Vec<Instance>>;

    /// Lists every instance in the project attached to the named network, across
    /// all zones. Used to refuse deleting a network still in use.
    async fn list_by_network(&self, project_id: &str, network_name: &str) -> ComputeResult<Vec<Instance>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryInstanceRepository {
    instances: Arc<RwLock<HashMap<(String, String, String), Instance>>>,
}

impl InMemoryInstanceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(project_id: &str, zone: &str, name: &str) -> (String, String, String) {
    (project_id.to_string(), zone.to_string(), name.to_string())
}

#[async_trait]
impl InstanceRepository for InMemoryInstanceRepository {
    async fn create_instance(&self, instance: Instance) -> ComputeResult<Instance> {
        let mut instances = self.instances.write().await;
        let k = key(&instance.project_id, &instance.zone, &instance.name);
        if instances.contains_key(&k) {
            return Err(ComputeError::AlreadyExists(instance.name));
        }
        instances.insert(k, instance.clone());
        Ok(instance)
    }

    async fn get_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<Option<Instance>> {
        let instances = self.instances.read().await;
        Ok(instances.get(&key(project_id, zone, name)).cloned())
    }

    async fn list_instances(&self, project_id: &str, zone: &str, filter: InstanceFilter) -> ComputeResult<Vec<Instance>> {
        let instances = self.instances.read().await;
        let mut result: Vec<Instance> = instances
            .values()
            .filter(|i| i.project_id == project_id && i.zone == zone)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result.into_iter().skip(filter.offset).take(filter.limit).collect())
    }

    async fn update_instance(&self, instance: Instance) -> ComputeResult<Instance> {
        let mut instances = self.instances.write().await;
        let k = key(&instance.project_id, &instance.zone, &instance.name);
        if !instances.contains_key(&k) {
            return Err(ComputeError::InstanceNotFound(instance.name));
        }
        instances.insert(k, instance.clone());
        Ok(instance)
    }

    async fn delete_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<bool> {
        let mut instances = self.instances.write().await;
        Ok(instances.remove(&key(project_id, zone, name)).is_some())
    }

    async fn delete_all_for_project(&self, project_id: &str) -> ComputeResult<Vec<Instance>> {
        let mut instances = self.instances.write().await;
        let removed_keys: Vec<_> = instances
            .iter()
            .filter(|(_, i)| i.project_id == project_id)
            .map(|(k, _)| k.clone())
            .collect();
        let mut removed = Vec::with_capacity(removed_keys.len());
        for k in removed_keys {
            if let Some(instance) = instances.remove(&k) {
                removed.push(instance);
            }
        }
        Ok(removed)
    }

    async fn list_by_network(&self, project_id: &str, network_name: &str) -> ComputeResult<Vec<Instance>> {
        let instances = self.instances.read().await;
        Ok(instances
            .values()
            .filter(|i| i.project_id == project_id && i.network_name == network_name)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(project_id: &str, name: &str) -> Instance {
        Instance::new(project_id, "us-central1-a", name, "e2-medium", "default", None, "vm-container")
    }

    #[tokio::test]
    async fn create_and_get_round_trips() {
        let repo = InMemoryInstanceRepository::new();
        let instance = sample("demo", "vm1");
        repo.create_instance(instance.clone()).await.unwrap();

        let fetched = repo
            .get_instance("demo", "us-central1-a", "vm1")
            .await
            .unwrap()
            .expect("instance should exist");
        assert_eq!(fetched.machine_type, "e2-medium");
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let repo = InMemoryInstanceRepository::new();
        repo.create_instance(sample("demo", "vm1")).await.unwrap();
        let err = repo.create_instance(sample("demo", "vm1")).await.unwrap_err();
        assert!(matches!(err, ComputeError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn list_is_scoped_per_project_and_zone() {
        let repo = InMemoryInstanceRepository::new();
        repo.create_instance(sample("demo", "vm1")).await.unwrap();
        repo.create_instance(sample("other", "vm2")).await.unwrap();

        let result = repo
            .list_instances("demo", "us-central1-a", InstanceFilter::default())
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "vm1");
    }

    #[tokio::test]
    async fn delete_removes_instance() {
        let repo = InMemoryInstanceRepository::new();
        repo.create_instance(sample("demo", "vm1")).await.unwrap();
        assert!(repo.delete_instance("demo", "us-central1-a", "vm1").await.unwrap());
        assert!(repo.get_instance("demo", "us-central1-a", "vm1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_all_for_project_only_removes_that_projects_instances() {
        let repo = InMemoryInstanceRepository::new();
        repo.create_instance(sample("demo", "vm1")).await.unwrap();
        repo.create_instance(sample("demo", "vm2")).await.unwrap();
        repo.create_instance(sample("other", "vm3")).await.unwrap();

        let removed = repo.delete_all_for_project("demo").await.unwrap();
        assert_eq!(removed.len(), 2);
        assert!(repo.get_instance("other", "us-central1-a", "vm3").await.unwrap().is_some());
    }
}
