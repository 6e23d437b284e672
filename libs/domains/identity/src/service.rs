use std::sync::Arc;
use validator::Validate;

use crate::error::{IdentityError, IdentityResult};
use crate::models::{CreateServiceAccount, ServiceAccount, ServiceAccountFilter};
use crate::repository::ServiceAccountRepository;

/// Service layer for service-account business logic.
#[derive(Clone)]
pub struct IdentityService<R: ServiceAccountRepository> {
    repository: Arc<R>,
}

impl<R: ServiceAccountRepository> IdentityService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_service_account(
        &self,
        project_id: &str,
        input: CreateServiceAccount,
    ) -> IdentityResult<ServiceAccount> {
        input
            .validate()
            .map_err(|e| IdentityError::InvalidArgument(e.to_string()))?;

        self.repository.create(project_id, input).await
    }

    pub async fn get_service_account(&self, email: &str) -> IdentityResult<ServiceAccount> {
        self.repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::NotFound(email.to_string()))
    }

    pub async fn list_service_accounts(
        &self,
        project_id: &str,
        filter: ServiceAccountFilter,
    ) -> IdentityResult<Vec<ServiceAccount>> {
        self.repository.list_by_project(project_id, filter).await
    }

    pub async fn delete_service_account(&self, email: &str) -> IdentityResult<()> {
        if !self.repository.delete(email).await? {
            return Err(IdentityError::NotFound(email.to_string()));
        }
        Ok(())
    }

    /// Key material is never emulated; exists purely for client compatibility.
    pub fn list_keys(&self, _email: &str) -> Vec<()> {
        Vec::new()
    }

    pub async fn delete_by_project(&self, project_id: &str) -> IdentityResult<u64> {
        self.repository.delete_by_project(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryServiceAccountRepository;

    fn service() -> IdentityService<InMemoryServiceAccountRepository> {
        IdentityService::new(InMemoryServiceAccountRepository::new())
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc = service();
        let created = svc
            .create_service_account(
                "demo-1",
                CreateServiceAccount {
                    account_id: "worker".to_string(),
                    display_name: String::new(),
                    description: String::new(),
                },
            )
            .await
            .unwrap();
        let fetched = svc.get_service_account(&created.email).await.unwrap();
        assert_eq!(fetched.unique_id.len(), 21);
    }

    #[tokio::test]
    async fn list_keys_is_always_empty() {
        let svc = service();
        assert!(svc.list_keys("anything@demo-1.iam.gserviceaccount.com").is_empty());
    }
}
