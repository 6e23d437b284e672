use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    entity,
    error::{IdentityError, IdentityResult},
    models::{CreateServiceAccount, ServiceAccount, ServiceAccountFilter},
    repository::ServiceAccountRepository,
};

#[derive(Clone)]
pub struct PgServiceAccountRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgServiceAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl ServiceAccountRepository for PgServiceAccountRepository {
    async fn create(&self, project_id: &str, input: CreateServiceAccount) -> IdentityResult<ServiceAccount> {
        let account = ServiceAccount::new(project_id, input);

        let exists = entity::Entity::find()
            .filter(entity::Column::Email.eq(account.email.clone()))
            .one(self.base.db())
            .await
            .map_err(|e| IdentityError::Internal(format!("database error: {e}")))?
            .is_some();

        if exists {
            return Err(IdentityError::AlreadyExists(account.email));
        }

        let active_model = entity::ActiveModel::from_domain(account);
        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(|e| IdentityError::Internal(format!("database error: {e}")))?;

        tracing::info!(email = %model.email, "created service account");
        Ok(model.into())
    }

    async fn get_by_email(&self, email: &str) -> IdentityResult<Option<ServiceAccount>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(self.base.db())
            .await
            .map_err(|e| IdentityError::Internal(format!("database error: {e}")))?;

        Ok(model.map(Into::into))
    }

    async fn list_by_project(
        &self,
        project_id: &str,
        filter: ServiceAccountFilter,
    ) -> IdentityResult<Vec<ServiceAccount>> {
        let models = entity::Entity::find()
            .filter(entity::Column::ProjectId.eq(project_id))
            .order_by_desc(entity::Column::CreateTime)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(self.base.db())
            .await
            .map_err(|e| IdentityError::Internal(format!("database error: {e}")))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, email: &str) -> IdentityResult<bool> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(self.base.db())
            .await
            .map_err(|e| IdentityError::Internal(format!("database error: {e}")))?;

        let Some(model) = model else {
            return Ok(false);
        };

        let rows = self
            .base
            .delete_by_id(model.id)
            .await
            .map_err(|e| IdentityError::Internal(format!("database error: {e}")))?;

        Ok(rows > 0)
    }

    async fn delete_by_project(&self, project_id: &str) -> IdentityResult<u64> {
        let result = entity::Entity::delete_many()
            .filter(entity::Column::ProjectId.eq(project_id))
            .exec(self.base.db())
            .await
            .map_err(|e| IdentityError::Internal(format!("database error: {e}")))?;

        Ok(result.rows_affected)
    }
}
