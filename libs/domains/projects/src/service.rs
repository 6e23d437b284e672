use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ProjectError, ProjectResult};
use crate::models::{CreateProject, Project, ProjectFilter};
use crate::repository::ProjectRepository;

/// Callback invoked synchronously after a project is persisted, so its `default`
/// network can be created before `CreateProject` returns to the caller. Implemented
/// by the composition root over the network service, to avoid this crate depending
/// on `domain_networks` for a single call.
#[async_trait]
pub trait DefaultNetworkEnsurer: Send + Sync {
    async fn ensure_default_network(&self, project_id: &str) -> Result<(), String>;
}

/// Invoked before the project row is deleted, so instances, networks, buckets,
/// and service accounts owned by the project are torn down first. Implemented
/// by the composition root, which is the only place that can see every domain
/// at once.
#[async_trait]
pub trait ProjectResourceCleaner: Send + Sync {
    async fn delete_all_project_resources(&self, project_id: &str) -> Result<(), String>;
}

/// Service layer for Project business logic.
#[derive(Clone)]
pub struct ProjectService<R: ProjectRepository> {
    repository: Arc<R>,
    network_ensurer: Arc<dyn DefaultNetworkEnsurer>,
    resource_cleaner: Option<Arc<dyn ProjectResourceCleaner>>,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repository: R, network_ensurer: Arc<dyn DefaultNetworkEnsurer>) -> Self {
        Self {
            repository: Arc::new(repository),
            network_ensurer,
            resource_cleaner: None,
        }
    }

    /// Wires in the cross-domain cascade-delete used by [`Self::delete_project`].
    /// Without this, deleting a project leaves its owned resources orphaned.
    pub fn with_resource_cleaner(mut self, cleaner: Arc<dyn ProjectResourceCleaner>) -> Self {
        self.resource_cleaner = Some(cleaner);
        self
    }

    /// Create a new project, then synchronously ensure its `default` network exists.
    pub async fn create_project(&self, input: CreateProject) -> ProjectResult<Project> {
        input
            .validate()
            .map_err(|e| ProjectError::InvalidArgument(e.to_string()))?;

        let project = self.repository.create(input).await?;

        self.network_ensurer
            .ensure_default_network(&project.project_id)
            .await
            .map_err(ProjectError::Internal)?;

        Ok(project)
    }

    pub async fn get_project(&self, project_id: &str) -> ProjectResult<Project> {
        self.repository
            .get_by_project_id(project_id)
            .await?
            .ok_or_else(|| ProjectError::NotFound(project_id.to_string()))
    }

    pub async fn list_projects(&self, filter: ProjectFilter) -> ProjectResult<Vec<Project>> {
        self.repository.list(filter).await
    }

    /// Deletes the project row after cascading to every owned resource.
    pub async fn delete_project(&self, project_id: &str) -> ProjectResult<()> {
        if !self.repository.exists(project_id).await? {
            return Err(ProjectError::NotFound(project_id.to_string()));
        }

        if let Some(cleaner) = &self.resource_cleaner {
            cleaner
                .delete_all_project_resources(project_id)
                .await
                .map_err(ProjectError::Internal)?;
        }

        let deleted = self.repository.delete(project_id).await?;

        if !deleted {
            return Err(ProjectError::NotFound(project_id.to_string()));
        }

        Ok(())
    }

    pub async fn exists(&self, project_id: &str) -> ProjectResult<bool> {
        self.repository.exists(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryProjectRepository;

    struct NoopEnsurer;

    #[async_trait]
    impl DefaultNetworkEnsurer for NoopEnsurer {
        async fn ensure_default_network(&self, _project_id: &str) -> Result<(), String> {
            Ok(())
        }
    }

    fn service() -> ProjectService<InMemoryProjectRepository> {
        ProjectService::new(InMemoryProjectRepository::new(), Arc::new(NoopEnsurer))
    }

    #[tokio::test]
    async fn rejects_project_id_that_is_too_short() {
        let svc = service();
        let result = svc
            .create_project(CreateProject {
                project_id: "ab".to_string(),
                display_name: String::new(),
            })
            .await;
        assert!(matches!(result, Err(ProjectError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc = service();
        let created = svc
            .create_project(CreateProject {
                project_id: "demo-1".to_string(),
                display_name: "Demo".to_string(),
            })
            .await
            .unwrap();
        let fetched = svc.get_project("demo-1").await.unwrap();
        assert_eq!(fetched.id, created.id);
    }
}
