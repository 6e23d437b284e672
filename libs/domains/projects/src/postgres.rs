use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    entity,
    error::{ProjectError, ProjectResult},
    models::{CreateProject, Project, ProjectFilter},
    repository::ProjectRepository,
};

#[derive(Clone)]
pub struct PgProjectRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgProjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, input: CreateProject) -> ProjectResult<Project> {
        if self.exists(&input.project_id).await? {
            return Err(ProjectError::AlreadyExists(input.project_id));
        }

        let active_model: entity::ActiveModel = input.into();
        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(|e| ProjectError::Internal(format!("database error: {e}")))?;

        tracing::info!(project_id = %model.project_id, "created project");
        Ok(model.into())
    }

    async fn get_by_project_id(&self, project_id: &str) -> ProjectResult<Option<Project>> {
        let model = entity::Entity::find()
            .filter(entity::Column::ProjectId.eq(project_id))
            .one(self.base.db())
            .await
            .map_err(|e| ProjectError::Internal(format!("database error: {e}")))?;

        Ok(model.map(Into::into))
    }

    async fn list(&self, filter: ProjectFilter) -> ProjectResult<Vec<Project>> {
        let models = entity::Entity::find()
            .order_by_desc(entity::Column::CreateTime)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(self.base.db())
            .await
            .map_err(|e| ProjectError::Internal(format!("database error: {e}")))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, project_id: &str) -> ProjectResult<bool> {
        let model = entity::Entity::find()
            .filter(entity::Column::ProjectId.eq(project_id))
            .one(self.base.db())
            .await
            .map_err(|e| ProjectError::Internal(format!("database error: {e}")))?;

        let Some(model) = model else {
            return Ok(false);
        };

        let rows = self
            .base
            .delete_by_id(model.id)
            .await
            .map_err(|e| ProjectError::Internal(format!("database error: {e}")))?;

        Ok(rows > 0)
    }

    async fn exists(&self, project_id: &str) -> ProjectResult<bool> {
        let exists = entity::Entity::find()
            .filter(entity::Column::ProjectId.eq(project_id))
            .one(self.base.db())
            .await
            .map_err(|e| ProjectError::Internal(format!("database error: {e}")))?
            .is_some();

        Ok(exists)
    }
}
