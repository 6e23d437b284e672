use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProjectError, ProjectResult};
use crate::models::{CreateProject, Project, ProjectFilter};

/// Repository trait for Project persistence.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, input: CreateProject) -> ProjectResult<Project>;
    async fn get_by_project_id(&self, project_id: &str) -> ProjectResult<Option<Project>>;
    async fn list(&self, filter: ProjectFilter) -> ProjectResult<Vec<Project>>;
    /// Deletes the project row. Callers are responsible for cascading to owned
    /// resources (networks, instances, buckets, service accounts) first.
    async fn delete(&self, project_id: &str) -> ProjectResult<bool>;
    async fn exists(&self, project_id: &str) -> ProjectResult<bool>;
}

/// In-memory implementation of ProjectRepository (for development/testing).
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<String, Project>>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn create(&self, input: CreateProject) -> ProjectResult<Project> {
        let mut projects = self.projects.write().await;

        if projects.contains_key(&input.project_id) {
            return Err(ProjectError::AlreadyExists(input.project_id));
        }

        let project = Project::new(input);
        projects.insert(project.project_id.clone(), project.clone());

        tracing::info!(project_id = %project.project_id, "Created project");
        Ok(project)
    }

    async fn get_by_project_id(&self, project_id: &str) -> ProjectResult<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).cloned())
    }

    async fn list(&self, filter: ProjectFilter) -> ProjectResult<Vec<Project>> {
        let projects = self.projects.read().await;

        let mut result: Vec<Project> = projects.values().cloned().collect();
        result.sort_by(|a, b| b.create_time.cmp(&a.create_time));

        Ok(result.into_iter().skip(filter.offset).take(filter.limit).collect())
    }

    async fn delete(&self, project_id: &str) -> ProjectResult<bool> {
        let mut projects = self.projects.write().await;
        Ok(projects.remove(project_id).is_some())
    }

    async fn exists(&self, project_id: &str) -> ProjectResult<bool> {
        let projects = self.projects.read().await;
        Ok(projects.contains_key(project_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_project() {
        let repo = InMemoryProjectRepository::new();

        let input = CreateProject {
            project_id: "demo-project".to_string(),
            display_name: "Demo".to_string(),
        };

        let project = repo.create(input).await.unwrap();
        assert_eq!(project.project_id, "demo-project");

        let fetched = repo.get_by_project_id(&project.project_id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().id, project.id);
    }

    #[tokio::test]
    async fn test_duplicate_project_id_error() {
        let repo = InMemoryProjectRepository::new();

        let input = CreateProject {
            project_id: "my-project".to_string(),
            display_name: String::new(),
        };

        repo.create(input.clone()).await.unwrap();

        let result = repo.create(input).await;
        assert!(matches!(result, Err(ProjectError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_uses_project_id_as_display_name_default() {
        let repo = InMemoryProjectRepository::new();
        let project = repo
            .create(CreateProject {
                project_id: "naming-test".to_string(),
                display_name: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(project.display_name, "naming-test");
    }
}
