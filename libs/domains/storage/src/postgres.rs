use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::BaseRepository;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::byte_store::Digests;
use crate::entity;
use crate::error::{StorageError, StorageResult};
use crate::models::{Acl, Bucket, BucketFilter, Object, SignedUrlSession};
use crate::repository::StorageRepository;

#[derive(Clone)]
pub struct PgStorageRepository {
    buckets: BaseRepository<entity::bucket::Entity>,
    objects: BaseRepository<entity::object::Entity>,
    sessions: BaseRepository<entity::signed_url_session::Entity>,
    db: DatabaseConnection,
}

impl PgStorageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            buckets: BaseRepository::new(db.clone()),
            objects: BaseRepository::new(db.clone()),
            sessions: BaseRepository::new(db.clone()),
            db,
        }
    }
}

fn db_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Internal(format!("database error: {e}"))
}

#[async_trait]
impl StorageRepository for PgStorageRepository {
    async fn create_bucket(&self, bucket: Bucket) -> StorageResult<Bucket> {
        if self.get_bucket(&bucket.name).await?.is_some() {
            return Err(StorageError::AlreadyExists(bucket.name));
        }
        let active: entity::bucket::ActiveModel = bucket.into();
        let model = self.buckets.insert(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn get_bucket(&self, name: &str) -> StorageResult<Option<Bucket>> {
        let model = entity::bucket::Entity::find()
            .filter(entity::bucket::Column::Name.eq(name))
            .one(self.buckets.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_buckets(&self, project_id: &str, filter: BucketFilter) -> StorageResult<Vec<Bucket>> {
        let models = entity::bucket::Entity::find()
            .filter(entity::bucket::Column::ProjectId.eq(project_id))
            .order_by_asc(entity::bucket::Column::Name)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(self.buckets.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_bucket(&self, bucket: Bucket) -> StorageResult<Bucket> {
        let active: entity::bucket::ActiveModel = bucket.into();
        let model = self.buckets.update(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn delete_bucket(&self, name: &str) -> StorageResult<bool> {
        let Some(bucket) = self.get_bucket(name).await? else {
            return Ok(false);
        };
        let rows = self.buckets.delete_by_id(bucket.id).await.map_err(db_err)?;
        Ok(rows > 0)
    }

    async fn count_live_objects(&self, bucket: &str) -> StorageResult<u64> {
        let count = entity::object::Entity::find()
            .filter(entity::object::Column::Bucket.eq(bucket))
            .filter(entity::object::Column::Deleted.eq(false))
            .count(self.objects.db())
            .await
            .map_err(db_err)?;
        Ok(count)
    }

    /// Locks every row for `(bucket, name)` with `SELECT ... FOR UPDATE` so
    /// concurrent uploads of the same object serialize instead of racing on the
    /// generation number, mirroring the subnet IP allocator's locking pattern.
    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        _versioning_enabled: bool,
        content_type: String,
        file_path: String,
        digests: Digests,
    ) -> StorageResult<Object> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = entity::object::Entity::find()
            .filter(entity::object::Column::Bucket.eq(bucket))
            .filter(entity::object::Column::Name.eq(name))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_err)?;

        let max_generation = existing.iter().map(|m| m.generation).max();
        let new_generation = max_generation.map(|g| g + 1).unwrap_or(1);
        let previous_latest = existing.into_iter().find(|m| m.is_latest);

        if let Some(previous) = previous_latest {
            let mut active: entity::object::ActiveModel = previous.into();
            active.is_latest = Set(false);
            active.update(&txn).await.map_err(db_err)?;
        }

        let object = Object::new(bucket, name, new_generation, &file_path, &content_type);
        let mut active: entity::object::ActiveModel = object.into();
        active.size = Set(digests.size as i64);
        active.md5_base64 = Set(digests.md5_base64);
        active.crc32c_base64 = Set(digests.crc32c_base64);
        let model = active.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn insert_object_version(&self, object: Object) -> StorageResult<Object> {
        let active: entity::object::ActiveModel = object.into();
        let model = self.objects.insert(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn get_latest_object(&self, bucket: &str, name: &str) -> StorageResult<Option<Object>> {
        let model = entity::object::Entity::find()
            .filter(entity::object::Column::Bucket.eq(bucket))
            .filter(entity::object::Column::Name.eq(name))
            .filter(entity::object::Column::IsLatest.eq(true))
            .filter(entity::object::Column::Deleted.eq(false))
            .one(self.objects.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn get_object_version(&self, bucket: &str, name: &str, generation: i64) -> StorageResult<Option<Object>> {
        let model = entity::object::Entity::find()
            .filter(entity::object::Column::Bucket.eq(bucket))
            .filter(entity::object::Column::Name.eq(name))
            .filter(entity::object::Column::Generation.eq(generation))
            .one(self.objects.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_objects(&self, bucket: &str, prefix: Option<&str>, limit: usize, versions: bool) -> StorageResult<Vec<Object>> {
        let mut query = entity::object::Entity::find().filter(entity::object::Column::Bucket.eq(bucket));
        if !versions {
            query = query
                .filter(entity::object::Column::IsLatest.eq(true))
                .filter(entity::object::Column::Deleted.eq(false));
        }
        if let Some(prefix) = prefix {
            query = query.filter(entity::object::Column::Name.starts_with(prefix));
        }
        let models = query
            .order_by_asc(entity::object::Column::Name)
            .order_by_asc(entity::object::Column::Generation)
            .limit(limit as u64)
            .all(self.objects.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_object(&self, bucket: &str, name: &str, versioning_enabled: bool) -> StorageResult<Option<Object>> {
        let Some(model) = entity::object::Entity::find()
            .filter(entity::object::Column::Bucket.eq(bucket))
            .filter(entity::object::Column::Name.eq(name))
            .filter(entity::object::Column::IsLatest.eq(true))
            .one(self.objects.db())
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        if versioning_enabled {
            let mut active: entity::object::ActiveModel = model.into();
            active.deleted = Set(true);
            active.is_latest = Set(false);
            let updated = active.update(self.objects.db()).await.map_err(db_err)?;
            Ok(Some(updated.into()))
        } else {
            let object: Object = model.clone().into();
            entity::object::Entity::delete_many()
                .filter(entity::object::Column::Bucket.eq(bucket))
                .filter(entity::object::Column::Name.eq(name))
                .exec(self.objects.db())
                .await
                .map_err(db_err)?;
            Ok(Some(object))
        }
    }

    async fn update_object_acl(&self, bucket: &str, name: &str, acl: Acl) -> StorageResult<Object> {
        let model = entity::object::Entity::find()
            .filter(entity::object::Column::Bucket.eq(bucket))
            .filter(entity::object::Column::Name.eq(name))
            .filter(entity::object::Column::IsLatest.eq(true))
            .one(self.objects.db())
            .await
            .map_err(db_err)?
            .ok_or_else(|| StorageError::ObjectNotFound(name.to_string()))?;

        let mut active: entity::object::ActiveModel = model.into();
        active.acl = Set(acl.as_str().to_string());
        let updated = active.update(self.objects.db()).await.map_err(db_err)?;
        Ok(updated.into())
    }

    async fn list_all_file_paths(&self) -> StorageResult<Vec<String>> {
        let models = entity::object::Entity::find()
            .all(self.objects.db())
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(|m| m.file_path).collect())
    }

    async fn create_signed_url_session(&self, session: SignedUrlSession) -> StorageResult<SignedUrlSession> {
        let active: entity::signed_url_session::ActiveModel = session.into();
        let model = self.sessions.insert(active).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn get_signed_url_session(&self, token: &str) -> StorageResult<Option<SignedUrlSession>> {
        let model = entity::signed_url_session::Entity::find()
            .filter(entity::signed_url_session::Column::Token.eq(token))
            .one(self.sessions.db())
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn increment_access_count(&self, token: &str) -> StorageResult<()> {
        if let Some(model) = entity::signed_url_session::Entity::find()
            .filter(entity::signed_url_session::Column::Token.eq(token))
            .one(self.sessions.db())
            .await
            .map_err(db_err)?
        {
            let count = model.access_count;
            let mut active: entity::signed_url_session::ActiveModel = model.into();
            active.access_count = Set(count + 1);
            active.update(self.sessions.db()).await.map_err(db_err)?;
        }
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let result = entity::signed_url_session::Entity::delete_many()
            .filter(entity::signed_url_session::Column::ExpiresAt.lte(now))
            .exec(self.sessions.db())
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_all_for_project(&self, project_id: &str) -> StorageResult<Vec<Bucket>> {
        let bucket_models = entity::bucket::Entity::find()
            .filter(entity::bucket::Column::ProjectId.eq(project_id))
            .all(self.buckets.db())
            .await
            .map_err(db_err)?;

        let names: Vec<String> = bucket_models.iter().map(|b| b.name.clone()).collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        entity::object::Entity::delete_many()
            .filter(entity::object::Column::Bucket.is_in(names.clone()))
            .exec(self.objects.db())
            .await
            .map_err(db_err)?;

        entity::signed_url_session::Entity::delete_many()
            .filter(entity::signed_url_session::Column::Bucket.is_in(names))
            .exec(self.sessions.db())
            .await
            .map_err(db_err)?;

        entity::bucket::Entity::delete_many()
            .filter(entity::bucket::Column::ProjectId.eq(project_id))
            .exec(self.buckets.db())
            .await
            .map_err(db_err)?;

        Ok(bucket_models.into_iter().map(Into::into).collect())
    }
}
