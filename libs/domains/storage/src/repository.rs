use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::byte_store::Digests;
use crate::error::{StorageError, StorageResult};
use crate::models::{Acl, Bucket, BucketFilter, Object, SignedUrlSession};

#[async_trait]
pub trait StorageRepository: Send + Sync {
    async fn create_bucket(&self, bucket: Bucket) -> StorageResult<Bucket>;
    async fn get_bucket(&self, name: &str) -> StorageResult<Option<Bucket>>;
    async fn list_buckets(&self, project_id: &str, filter: BucketFilter) -> StorageResult<Vec<Bucket>>;
    async fn update_bucket(&self, bucket: Bucket) -> StorageResult<Bucket>;
    async fn delete_bucket(&self, name: &str) -> StorageResult<bool>;
    async fn count_live_objects(&self, bucket: &str) -> StorageResult<u64>;

    /// Assigns the next generation for `(bucket, name)` under a write lock,
    /// demotes the previous `is_latest` row (if any) rather than discarding it,
    /// and persists the new row as the new latest generation. Every upload keeps
    /// its predecessor retrievable by explicit `?generation=N`, regardless of
    /// `versioning_enabled`; that flag only changes what `delete_object` does to
    /// old generations, not what `upload_object` keeps.
    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        versioning_enabled: bool,
        content_type: String,
        file_path: String,
        digests: Digests,
    ) -> StorageResult<Object>;

    async fn insert_object_version(&self, object: Object) -> StorageResult<Object>;
    async fn get_latest_object(&self, bucket: &str, name: &str) -> StorageResult<Option<Object>>;
    async fn get_object_version(&self, bucket: &str, name: &str, generation: i64) -> StorageResult<Option<Object>>;
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>, limit: usize, versions: bool) -> StorageResult<Vec<Object>>;

    /// When `versioning_enabled`, soft-deletes the latest generation and keeps
    /// every prior generation intact for explicit `?generation=N` reads. When
    /// not, hard-deletes every generation row for `(bucket, name)`: with no
    /// versioning the object is gone, so the history `upload_object` retains
    /// for generation pinning shouldn't outlive the object and block the
    /// bucket from ever reporting empty.
    async fn delete_object(&self, bucket: &str, name: &str, versioning_enabled: bool) -> StorageResult<Option<Object>>;
    async fn update_object_acl(&self, bucket: &str, name: &str, acl: Acl) -> StorageResult<Object>;

    /// Every file path referenced by any object row, live or soft-deleted, across
    /// every bucket. Used by the orphan sweeper to tell a reachable blob from an
    /// abandoned one.
    async fn list_all_file_paths(&self) -> StorageResult<Vec<String>>;

    async fn create_signed_url_session(&self, session: SignedUrlSession) -> StorageResult<SignedUrlSession>;
    async fn get_signed_url_session(&self, token: &str) -> StorageResult<Option<SignedUrlSession>>;
    async fn increment_access_count(&self, token: &str) -> StorageResult<()>;
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StorageResult<u64>;

    /// Forcibly deletes every bucket owned by a project along with every object
    /// row it holds, including non-latest and already-soft-deleted generations,
    /// bypassing the non-empty-bucket guard in `delete_bucket`. Returns the
    /// deleted buckets so the caller can let the orphan sweeper reclaim their
    /// blobs. Used by project cascade-delete.
    async fn delete_all_for_project(&self, project_id: &str) -> StorageResult<Vec<Bucket>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStorageRepository {
    buckets: Arc<RwLock<HashMap<String, Bucket>>>,
    objects: Arc<RwLock<HashMap<(String, String, i64), Object>>>,
    sessions: Arc<RwLock<HashMap<String, SignedUrlSession>>>,
}

impl InMemoryStorageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorageRepository {
    async fn create_bucket(&self, bucket: Bucket) -> StorageResult<Bucket> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(&bucket.name) {
            return Err(StorageError::AlreadyExists(bucket.name));
        }
        buckets.insert(bucket.name.clone(), bucket.clone());
        Ok(bucket)
    }

    async fn get_bucket(&self, name: &str) -> StorageResult<Option<Bucket>> {
        Ok(self.buckets.read().await.get(name).cloned())
    }

    async fn list_buckets(&self, project_id: &str, filter: BucketFilter) -> StorageResult<Vec<Bucket>> {
        let buckets = self.buckets.read().await;
        let mut result: Vec<Bucket> = buckets
            .values()
            .filter(|b| b.project_id == project_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result.into_iter().skip(filter.offset).take(filter.limit).collect())
    }

    async fn update_bucket(&self, bucket: Bucket) -> StorageResult<Bucket> {
        let mut buckets = self.buckets.write().await;
        if !buckets.contains_key(&bucket.name) {
            return Err(StorageError::BucketNotFound(bucket.name));
        }
        buckets.insert(bucket.name.clone(), bucket.clone());
        Ok(bucket)
    }

    async fn delete_bucket(&self, name: &str) -> StorageResult<bool> {
        Ok(self.buckets.write().await.remove(name).is_some())
    }

    async fn count_live_objects(&self, bucket: &str) -> StorageResult<u64> {
        let objects = self.objects.read().await;
        Ok(objects
            .values()
            .filter(|o| o.bucket == bucket && !o.deleted)
            .count() as u64)
    }

    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        _versioning_enabled: bool,
        content_type: String,
        file_path: String,
        digests: Digests,
    ) -> StorageResult<Object> {
        let mut objects = self.objects.write().await;

        let max_generation = objects
            .values()
            .filter(|o| o.bucket == bucket && o.name == name)
            .map(|o| o.generation)
            .max();

        let existing_latest = objects
            .values()
            .find(|o| o.bucket == bucket && o.name == name && o.is_latest)
            .cloned();

        let new_generation = max_generation.map(|g| g + 1).unwrap_or(1);

        if let Some(mut previous) = existing_latest {
            previous.is_latest = false;
            objects.insert((bucket.to_string(), name.to_string(), previous.generation), previous);
        }

        let mut object = Object::new(bucket, name, new_generation, &file_path, &content_type);
        object.size = digests.size as i64;
        object.md5_base64 = digests.md5_base64;
        object.crc32c_base64 = digests.crc32c_base64;
        objects.insert((bucket.to_string(), name.to_string(), new_generation), object.clone());
        Ok(object)
    }

    async fn insert_object_version(&self, object: Object) -> StorageResult<Object> {
        let mut objects = self.objects.write().await;
        objects.insert((object.bucket.clone(), object.name.clone(), object.generation), object.clone());
        Ok(object)
    }

    async fn get_latest_object(&self, bucket: &str, name: &str) -> StorageResult<Option<Object>> {
        let objects = self.objects.read().await;
        Ok(objects
            .values()
            .find(|o| o.bucket == bucket && o.name == name && o.is_latest && !o.deleted)
            .cloned())
    }

    async fn get_object_version(&self, bucket: &str, name: &str, generation: i64) -> StorageResult<Option<Object>> {
        let objects = self.objects.read().await;
        Ok(objects.get(&(bucket.to_string(), name.to_string(), generation)).cloned())
    }

    async fn list_objects(&self, bucket: &str, prefix: Option<&str>, limit: usize, versions: bool) -> StorageResult<Vec<Object>> {
        let objects = self.objects.read().await;
        let mut result: Vec<Object> = objects
            .values()
            .filter(|o| {
                o.bucket == bucket
                    && (versions || (o.is_latest && !o.deleted))
                    && prefix.is_none_or(|p| o.name.starts_with(p))
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name).then(a.generation.cmp(&b.generation)));
        result.truncate(limit);
        Ok(result)
    }

    async fn delete_object(&self, bucket: &str, name: &str, versioning_enabled: bool) -> StorageResult<Option<Object>> {
        let mut objects = self.objects.write().await;
        let key_generation = objects
            .values()
            .find(|o| o.bucket == bucket && o.name == name && o.is_latest)
            .map(|o| o.generation);

        let Some(generation) = key_generation else {
            return Ok(None);
        };

        if versioning_enabled {
            let object = objects.get_mut(&(bucket.to_string(), name.to_string(), generation)).unwrap();
            object.deleted = true;
            object.is_latest = false;
            Ok(Some(object.clone()))
        } else {
            let object = objects.remove(&(bucket.to_string(), name.to_string(), generation));
            objects.retain(|(b, n, _), _| !(b == bucket && n == name));
            Ok(object)
        }
    }

    async fn update_object_acl(&self, bucket: &str, name: &str, acl: Acl) -> StorageResult<Object> {
        let mut objects = self.objects.write().await;
        let object = objects
            .values_mut()
            .find(|o| o.bucket == bucket && o.name == name && o.is_latest)
            .ok_or_else(|| StorageError::ObjectNotFound(name.to_string()))?;
        object.acl = acl;
        Ok(object.clone())
    }

    async fn list_all_file_paths(&self) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().await;
        Ok(objects.values().map(|o| o.file_path.clone()).collect())
    }

    async fn create_signed_url_session(&self, session: SignedUrlSession) -> StorageResult<SignedUrlSession> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn get_signed_url_session(&self, token: &str) -> StorageResult<Option<SignedUrlSession>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn increment_access_count(&self, token: &str) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(token) {
            session.access_count += 1;
        }
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_all_for_project(&self, project_id: &str) -> StorageResult<Vec<Bucket>> {
        let mut buckets = self.buckets.write().await;
        let removed: Vec<Bucket> = buckets
            .values()
            .filter(|b| b.project_id == project_id)
            .cloned()
            .collect();
        let names: std::collections::HashSet<String> = removed.iter().map(|b| b.name.clone()).collect();
        buckets.retain(|_, b| b.project_id != project_id);
        drop(buckets);

        let mut objects = self.objects.write().await;
        objects.retain(|_, o| !names.contains(&o.bucket));
        drop(objects);

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !names.contains(&s.bucket));

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateBucket;

    fn digests() -> Digests {
        Digests {
            md5_base64: "abc".to_string(),
            crc32c_base64: "def".to_string(),
            size: 11,
        }
    }

    #[tokio::test]
    async fn create_and_get_bucket_round_trips() {
        let repo = InMemoryStorageRepository::new();
        let bucket = Bucket::new(
            "demo",
            &CreateBucket {
                name: "my-bucket".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: false,
            },
        );
        repo.create_bucket(bucket.clone()).await.unwrap();

        let fetched = repo.get_bucket("my-bucket").await.unwrap().unwrap();
        assert_eq!(fetched.project_id, "demo");
    }

    #[tokio::test]
    async fn upload_without_versioning_still_keeps_prior_generation_readable() {
        let repo = InMemoryStorageRepository::new();
        repo.upload_object("b", "o.txt", false, "text/plain".to_string(), "b/o.txt".to_string(), digests())
            .await
            .unwrap();
        let second = repo
            .upload_object("b", "o.txt", false, "text/plain".to_string(), "b/o.txt".to_string(), digests())
            .await
            .unwrap();

        assert_eq!(second.generation, 2);
        let v1 = repo.get_object_version("b", "o.txt", 1).await.unwrap().unwrap();
        assert!(!v1.is_latest);
        let latest = repo.get_latest_object("b", "o.txt").await.unwrap().unwrap();
        assert_eq!(latest.generation, 2);
    }

    #[tokio::test]
    async fn upload_with_versioning_keeps_history() {
        let repo = InMemoryStorageRepository::new();
        repo.upload_object("b", "o.txt", true, "text/plain".to_string(), "b/o.txt".to_string(), digests())
            .await
            .unwrap();
        let second = repo
            .upload_object("b", "o.txt", true, "text/plain".to_string(), "b/o.txt".to_string(), digests())
            .await
            .unwrap();

        assert_eq!(second.generation, 2);
        let v1 = repo.get_object_version("b", "o.txt", 1).await.unwrap().unwrap();
        assert!(!v1.is_latest);
        let latest = repo.get_latest_object("b", "o.txt").await.unwrap().unwrap();
        assert_eq!(latest.generation, 2);
    }

    #[tokio::test]
    async fn delete_all_for_project_purges_every_generation() {
        let repo = InMemoryStorageRepository::new();
        let bucket = Bucket::new(
            "demo",
            &CreateBucket {
                name: "my-bucket".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: true,
            },
        );
        repo.create_bucket(bucket).await.unwrap();
        repo.upload_object("my-bucket", "o.txt", true, "text/plain".to_string(), "p1".to_string(), digests())
            .await
            .unwrap();
        repo.upload_object("my-bucket", "o.txt", true, "text/plain".to_string(), "p2".to_string(), digests())
            .await
            .unwrap();
        repo.delete_object("my-bucket", "o.txt", true).await.unwrap();

        let removed = repo.delete_all_for_project("demo").await.unwrap();
        assert_eq!(removed.len(), 1);
        assert!(repo.get_bucket("my-bucket").await.unwrap().is_none());

        let objects = repo.objects.read().await;
        assert!(objects.keys().all(|(bucket, _, _)| bucket != "my-bucket"));
    }
}
