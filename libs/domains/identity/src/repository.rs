use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{IdentityError, IdentityResult};
use crate::models::{CreateServiceAccount, ServiceAccount, ServiceAccountFilter};

/// Repository trait for ServiceAccount persistence.
#[async_trait]
pub trait ServiceAccountRepository: Send + Sync {
    async fn create(&self, project_id: &str, input: CreateServiceAccount) -> IdentityResult<ServiceAccount>;
    async fn get_by_email(&self, email: &str) -> IdentityResult<Option<ServiceAccount>>;
    async fn list_by_project(
        &self,
        project_id: &str,
        filter: ServiceAccountFilter,
    ) -> IdentityResult<Vec<ServiceAccount>>;
    async fn delete(&self, email: &str) -> IdentityResult<bool>;
    /// Deletes every service account owned by a project. Used by project cascade-delete.
    async fn delete_by_project(&self, project_id: &str) -> IdentityResult<u64>;
}

/// In-memory implementation of ServiceAccountRepository (for development/testing).
#[derive(Debug, Default, Clone)]
pub struct InMemoryServiceAccountRepository {
    accounts: Arc<RwLock<HashMap<String, ServiceAccount>>>,
}

impl InMemoryServiceAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ServiceAccountRepository for InMemoryServiceAccountRepository {
    async fn create(&self, project_id: &str, input: CreateServiceAccount) -> IdentityResult<ServiceAccount> {
        let account = ServiceAccount::new(project_id, input);
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&account.email) {
            return Err(IdentityError::AlreadyExists(account.email));
        }

        accounts.insert(account.email.clone(), account.clone());
        tracing::info!(email = %account.email, "created service account");
        Ok(account)
    }

    async fn get_by_email(&self, email: &str) -> IdentityResult<Option<ServiceAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(email).cloned())
    }

    async fn list_by_project(
        &self,
        project_id: &str,
        filter: ServiceAccountFilter,
    ) -> IdentityResult<Vec<ServiceAccount>> {
        let accounts = self.accounts.read().await;
        let mut result: Vec<ServiceAccount> = accounts
            .values()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(result.into_iter().skip(filter.offset).take(filter.limit).collect())
    }

    async fn delete(&self, email: &str) -> IdentityResult<bool> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.remove(email).is_some())
    }

    async fn delete_by_project(&self, project_id: &str) -> IdentityResult<u64> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|_, a| a.project_id != project_id);
        Ok((before - accounts.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(account_id: &str) -> CreateServiceAccount {
        CreateServiceAccount {
            account_id: account_id.to_string(),
            display_name: String::new(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn builds_canonical_email() {
        let repo = InMemoryServiceAccountRepository::new();
        let account = repo.create("demo-1", input("builder")).await.unwrap();
        assert_eq!(account.email, "builder@demo-1.iam.gserviceaccount.com");
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let repo = InMemoryServiceAccountRepository::new();
        repo.create("demo-1", input("dup")).await.unwrap();
        let result = repo.create("demo-1", input("dup")).await;
        assert!(matches!(result, Err(IdentityError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn delete_by_project_removes_only_that_projects_accounts() {
        let repo = InMemoryServiceAccountRepository::new();
        repo.create("demo-1", input("a")).await.unwrap();
        repo.create("demo-2", input("a")).await.unwrap();
        let removed = repo.delete_by_project("demo-1").await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_by_email("a@demo-2.iam.gserviceaccount.com").await.unwrap().is_some());
    }
}
