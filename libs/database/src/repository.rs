//! Generic repository abstraction over a SeaORM entity with a UUID primary key.
//!
//! Domain crates wrap a [`BaseRepository`] for the handful of operations shared by
//! every entity (insert, find by id, update, delete by id) and implement anything
//! entity-specific (filtered listing, uniqueness checks) directly against
//! `sea_orm::Entity::find()` using the connection returned by [`BaseRepository::db`].

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PrimaryKeyTrait};
use uuid::Uuid;

use crate::common::DatabaseResult;

/// Marker for entities in this workspace: every one of them keys on a [`Uuid`]
/// primary key with no auto-increment, so `BaseRepository` can be generic over them.
pub trait UuidEntity: EntityTrait
where
    <Self::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
}

impl<E> UuidEntity for E
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
}

/// Thin wrapper over a pooled connection, providing the CRUD operations every
/// domain repository needs for a single entity.
///
/// `Clone` is implemented by hand rather than derived: the derive macro would
/// add a spurious `E: Clone` bound even though `E` only appears behind a
/// `PhantomData`.
pub struct BaseRepository<E>
where
    E: UuidEntity,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    db: DatabaseConnection,
    _entity: std::marker::PhantomData<E>,
}

impl<E> Clone for BaseRepository<E>
where
    E: UuidEntity,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: std::marker::PhantomData,
        }
    }
}

impl<E> BaseRepository<E>
where
    E: UuidEntity,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: std::marker::PhantomData,
        }
    }

    /// The underlying connection, for entity-specific queries domain repositories build themselves.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn insert(&self, model: E::ActiveModel) -> DatabaseResult<E::Model> {
        let model = model.insert(&self.db).await?;
        Ok(model)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<E::Model>> {
        let model = E::find_by_id(id.into()).one(&self.db).await?;
        Ok(model)
    }

    pub async fn update(&self, model: E::ActiveModel) -> DatabaseResult<E::Model> {
        let model = model.update(&self.db).await?;
        Ok(model)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> DatabaseResult<u64> {
        let result = E::delete_by_id(id.into()).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
