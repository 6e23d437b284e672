use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    entity,
    error::{ComputeError, ComputeResult},
    models::{Instance, InstanceFilter},
    repository::InstanceRepository,
};

#[derive(Clone)]
pub struct PgInstanceRepository {
    instances: BaseRepository<entity::instance::Entity>,
}

impl PgInstanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            instances: BaseRepository::new(db),
        }
    }
}

fn db_err(e: impl std::fmt::Display) -> ComputeError {
    ComputeError::Internal(format!("database error: {e}"))
}

#[async_trait]
impl InstanceRepository for PgInstanceRepository {
    async fn create_instance(&self, instance: Instance) -> ComputeResult<Instance> {
        if self
            .get_instance(&instance.project_id, &instance.zone, &instance.name)
            .await?
            .is_some()
        {
            return Err(ComputeError::AlreadyExists(instance.name));
        }
        let active: entity::instance::ActiveModel = instance.into();
        let model = self.instances.insert(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn get_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<Option<Instance>> {
        let model = entity::instance::Entity::find()
            .filter(entity::instance::Column::ProjectId.eq(project_id))
            .filter(entity::instance::Column::Zone.eq(zone))
            .filter(entity::instance::Column::Name.eq(name))
            .one(self.instances.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_instances(&self, project_id: &str, zone: &str, filter: InstanceFilter) -> ComputeResult<Vec<Instance>> {
        let models = entity::instance::Entity::find()
            .filter(entity::instance::Column::ProjectId.eq(project_id))
            .filter(entity::instance::Column::Zone.eq(zone))
            .order_by_asc(entity::instance::Column::Name)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(self.instances.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_instance(&self, instance: Instance) -> ComputeResult<Instance> {
        let active: entity::instance::ActiveModel = instance.into();
        let model = self.instances.update(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn delete_instance(&self, project_id: &str, zone: &str, name: &str) -> ComputeResult<bool> {
        let Some(instance) = self.get_instance(project_id, zone, name).await? else {
            return Ok(false);
        };
        let rows = self.instances.delete_by_id(instance.id).await.map_err(db_err)?;
        Ok(rows > 0)
    }

    async fn delete_all_for_project(&self, project_id: &str) -> ComputeResult<Vec<Instance>> {
        let models = entity::instance::Entity::find()
            .filter(entity::instance::Column::ProjectId.eq(project_id))
            .all(self.instances.db())
            .await
            .map_err(db_err)?;

        entity::instance::Entity::delete_many()
            .filter(entity::instance::Column::ProjectId.eq(project_id))
            .exec(self.instances.db())
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_by_network(&self, project_id: &str, network_name: &str) -> ComputeResult<Vec<Instance>> {
        let models = entity::instance::Entity::find()
            .filter(entity::instance::Column::ProjectId.eq(project_id))
            .filter(entity::instance::Column::NetworkName.eq(network_name))
            .all(self.instances.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
