use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{NetworkError, NetworkResult},
    models::{Network, NetworkFilter, Route, Subnet},
    repository::NetworkRepository,
};

#[derive(Clone)]
pub struct PgNetworkRepository {
    networks: BaseRepository<entity::network::Entity>,
    subnets: BaseRepository<entity::subnet::Entity>,
    routes: BaseRepository<entity::route::Entity>,
    db: DatabaseConnection,
}

impl PgNetworkRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            networks: BaseRepository::new(db.clone()),
            subnets: BaseRepository::new(db.clone()),
            routes: BaseRepository::new(db.clone()),
            db,
        }
    }
}

fn db_err(e: impl std::fmt::Display) -> NetworkError {
    NetworkError::Internal(format!("database error: {e}"))
}

#[async_trait]
impl NetworkRepository for PgNetworkRepository {
    async fn create_network(&self, network: Network) -> NetworkResult<Network> {
        if self.get_network(&network.project_id, &network.name).await?.is_some() {
            return Err(NetworkError::AlreadyExists(network.name));
        }
        let active: entity::network::ActiveModel = network.into();
        let model = self.networks.insert(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn get_network(&self, project_id: &str, name: &str) -> NetworkResult<Option<Network>> {
        let model = entity::network::Entity::find()
            .filter(entity::network::Column::ProjectId.eq(project_id))
            .filter(entity::network::Column::Name.eq(name))
            .one(self.networks.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_networks(&self, project_id: &str, filter: NetworkFilter) -> NetworkResult<Vec<Network>> {
        let models = entity::network::Entity::find()
            .filter(entity::network::Column::ProjectId.eq(project_id))
            .order_by_asc(entity::network::Column::Name)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(self.networks.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_network(&self, project_id: &str, name: &str) -> NetworkResult<bool> {
        let Some(network) = self.get_network(project_id, name).await? else {
            return Ok(false);
        };
        let rows = self.networks.delete_by_id(network.id).await.map_err(db_err)?;
        Ok(rows > 0)
    }

    async fn create_subnet(&self, subnet: Subnet) -> NetworkResult<Subnet> {
        if self.get_subnet(&subnet.project_id, &subnet.region, &subnet.name).await?.is_some() {
            return Err(NetworkError::AlreadyExists(subnet.name));
        }
        let active: entity::subnet::ActiveModel = subnet.into();
        let model = self.subnets.insert(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn get_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<Option<Subnet>> {
        let model = entity::subnet::Entity::find()
            .filter(entity::subnet::Column::ProjectId.eq(project_id))
            .filter(entity::subnet::Column::Region.eq(region))
            .filter(entity::subnet::Column::Name.eq(name))
            .one(self.subnets.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_subnets(&self, project_id: &str, region: &str) -> NetworkResult<Vec<Subnet>> {
        let models = entity::subnet::Entity::find()
            .filter(entity::subnet::Column::ProjectId.eq(project_id))
            .filter(entity::subnet::Column::Region.eq(region))
            .order_by_asc(entity::subnet::Column::Name)
            .all(self.subnets.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_subnets_for_network(&self, project_id: &str, network_name: &str) -> NetworkResult<Vec<Subnet>> {
        let models = entity::subnet::Entity::find()
            .filter(entity::subnet::Column::ProjectId.eq(project_id))
            .filter(entity::subnet::Column::NetworkName.eq(network_name))
            .all(self.subnets.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_subnet(&self, project_id: &str, region: &str, name: &str) -> NetworkResult<bool> {
        let Some(subnet) = self.get_subnet(project_id, region, name).await? else {
            return Ok(false);
        };
        let rows = self.subnets.delete_by_id(subnet.id).await.map_err(db_err)?;
        Ok(rows > 0)
    }

    /// Runs the increment inside a transaction with `SELECT ... FOR UPDATE` so
    /// concurrent allocations on the same subnet serialize instead of racing.
    async fn allocate_ip(&self, subnet_id: Uuid) -> NetworkResult<i64> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = entity::subnet::Entity::find_by_id(subnet_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| NetworkError::SubnetNotFound(subnet_id.to_string()))?;

        let cidr = crate::cidr::Cidr::parse(&model.cidr).map_err(NetworkError::InvalidArgument)?;
        if model.next_offset as u64 >= cidr.size() {
            return Err(NetworkError::ResourceExhausted(model.name));
        }

        let offset = model.next_offset;
        let mut active: entity::subnet::ActiveModel = model.into();
        active.next_offset = Set(offset + 1);
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(offset)
    }

    async fn release_ip(&self, subnet_id: Uuid, offset: i64) -> NetworkResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let Some(model) = entity::subnet::Entity::find_by_id(subnet_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(());
        };

        if model.next_offset == offset + 1 {
            let mut active: entity::subnet::ActiveModel = model.into();
            active.next_offset = Set(offset);
            active.update(&txn).await.map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn create_route(&self, route: Route) -> NetworkResult<Route> {
        if self.get_route(&route.project_id, &route.name).await?.is_some() {
            return Err(NetworkError::AlreadyExists(route.name));
        }
        let active: entity::route::ActiveModel = route.into();
        let model = self.routes.insert(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn get_route(&self, project_id: &str, name: &str) -> NetworkResult<Option<Route>> {
        let model = entity::route::Entity::find()
            .filter(entity::route::Column::ProjectId.eq(project_id))
            .filter(entity::route::Column::Name.eq(name))
            .one(self.routes.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_routes(&self, project_id: &str) -> NetworkResult<Vec<Route>> {
        let models = entity::route::Entity::find()
            .filter(entity::route::Column::ProjectId.eq(project_id))
            .order_by_asc(entity::route::Column::Name)
            .all(self.routes.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_route(&self, route: Route) -> NetworkResult<Route> {
        let active: entity::route::ActiveModel = route.into();
        let model = self.routes.update(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn delete_route(&self, project_id: &str, name: &str) -> NetworkResult<bool> {
        let Some(route) = self.get_route(project_id, name).await? else {
            return Ok(false);
        };
        let rows = self.routes.delete_by_id(route.id).await.map_err(db_err)?;
        Ok(rows > 0)
    }

    async fn delete_all_for_project(&self, project_id: &str) -> NetworkResult<Vec<Network>> {
        entity::route::Entity::delete_many()
            .filter(entity::route::Column::ProjectId.eq(project_id))
            .exec(self.routes.db())
            .await
            .map_err(db_err)?;

        entity::subnet::Entity::delete_many()
            .filter(entity::subnet::Column::ProjectId.eq(project_id))
            .exec(self.subnets.db())
            .await
            .map_err(db_err)?;

        let models = entity::network::Entity::find()
            .filter(entity::network::Column::ProjectId.eq(project_id))
            .all(self.networks.db())
            .await
            .map_err(db_err)?;

        entity::network::Entity::delete_many()
            .filter(entity::network::Column::ProjectId.eq(project_id))
            .exec(self.networks.db())
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
