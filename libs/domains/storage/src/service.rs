use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use chrono::{Duration as ChronoDuration, Utc};
use rand::RngCore;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::byte_store::ByteStore;
use crate::error::{StorageError, StorageResult};
use crate::models::{
    Acl, AclView, Bucket, BucketFilter, CreateBucket, ListObjectsQuery, Object, ObjectQuery,
    RewriteResponse, SignedUrlRequest, SignedUrlResponse, SignedUrlSession, UpdateAcl,
    UpdateBucket,
};
use crate::models::ObjectView;
use crate::repository::StorageRepository;

/// Bucket/object business logic. Object bytes are written through [`ByteStore`]
/// before their metadata row is ever visible to a reader, so a crash between the
/// two steps never exposes a row pointing at missing bytes; the inverse (bytes
/// with no row) is swept up by [`Self::sweep_orphans`].
#[derive(Clone)]
pub struct StorageService<R: StorageRepository> {
    repository: Arc<R>,
    byte_store: Arc<ByteStore>,
    signed_url_base: String,
}

impl<R: StorageRepository> StorageService<R> {
    pub fn new(repository: R, byte_store: Arc<ByteStore>, signed_url_base: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            byte_store,
            signed_url_base: signed_url_base.into(),
        }
    }

    /// Base URL used both for signed-URL tokens and for the `selfLink` field of
    /// bucket/object wire views.
    pub fn self_link_base(&self) -> &str {
        &self.signed_url_base
    }

    pub async fn create_bucket(&self, project_id: &str, input: CreateBucket) -> StorageResult<Bucket> {
        input
            .validate()
            .map_err(|e| StorageError::InvalidArgument(e.to_string()))?;

        if self.repository.get_bucket(&input.name).await?.is_some() {
            return Err(StorageError::AlreadyExists(input.name));
        }

        let bucket = Bucket::new(project_id, &input);
        self.repository.create_bucket(bucket).await
    }

    pub async fn get_bucket(&self, name: &str) -> StorageResult<Bucket> {
        self.repository
            .get_bucket(name)
            .await?
            .ok_or_else(|| StorageError::BucketNotFound(name.to_string()))
    }

    pub async fn list_buckets(&self, project_id: &str, filter: BucketFilter) -> StorageResult<Vec<Bucket>> {
        self.repository.list_buckets(project_id, filter).await
    }

    pub async fn update_bucket(&self, name: &str, input: UpdateBucket) -> StorageResult<Bucket> {
        let mut bucket = self.get_bucket(name).await?;
        if let Some(versioning_enabled) = input.versioning_enabled {
            bucket.versioning_enabled = versioning_enabled;
        }
        if let Some(default_object_acl) = input.default_object_acl {
            bucket.default_object_acl = default_object_acl;
        }
        bucket.update_time = Utc::now();
        self.repository.update_bucket(bucket).await
    }

    /// Rejects deletion while any live (non-deleted) object remains, matching the
    /// cloud's requirement that a bucket be emptied before it can be removed.
    pub async fn delete_bucket(&self, name: &str) -> StorageResult<()> {
        self.get_bucket(name).await?;

        let live = self.repository.count_live_objects(name).await?;
        if live > 0 {
            return Err(StorageError::FailedPrecondition(format!(
                "bucket '{name}' is not empty"
            )));
        }

        let deleted = self.repository.delete_bucket(name).await?;
        if !deleted {
            return Err(StorageError::BucketNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Writes `bytes` to a fresh blob, then asks the repository to assign the
    /// object its generation and, for a versioning-enabled bucket, demote the
    /// previous latest row. A bucket's `default_object_acl` is applied to every
    /// newly created object.
    pub async fn upload_object(
        &self,
        bucket_name: &str,
        name: &str,
        content_type: String,
        bytes: Vec<u8>,
    ) -> StorageResult<Object> {
        let bucket = self.get_bucket(bucket_name).await?;
        self.byte_store.sanitize_name(bucket_name, name)?;

        let blob_path = self.byte_store.blob_path(bucket_name, name, Uuid::new_v4())?;
        let digests = self.byte_store.write_atomic(&blob_path, &bytes).await?;

        let object = self
            .repository
            .upload_object(
                bucket_name,
                name,
                bucket.versioning_enabled,
                content_type,
                blob_path.to_string_lossy().into_owned(),
                digests,
            )
            .await?;

        if bucket.default_object_acl != Acl::Private {
            return self
                .repository
                .update_object_acl(bucket_name, name, bucket.default_object_acl)
                .await;
        }

        Ok(object)
    }

    pub async fn get_object_metadata(&self, bucket_name: &str, query: &ObjectQuery) -> StorageResult<Object> {
        let name = query
            .name
            .as_deref()
            .ok_or_else(|| StorageError::InvalidArgument("name is required".to_string()))?;
        self.resolve_object(bucket_name, name, query.generation).await
    }

    pub async fn download_object(
        &self,
        bucket_name: &str,
        name: &str,
        generation: Option<i64>,
    ) -> StorageResult<(Object, Vec<u8>)> {
        let object = self.resolve_object(bucket_name, name, generation).await?;
        let bytes = self.byte_store.read(std::path::Path::new(&object.file_path)).await?;
        Ok((object, bytes))
    }

    async fn resolve_object(&self, bucket_name: &str, name: &str, generation: Option<i64>) -> StorageResult<Object> {
        match generation {
            Some(generation) => self
                .repository
                .get_object_version(bucket_name, name, generation)
                .await?
                .ok_or_else(|| StorageError::ObjectNotFound(name.to_string())),
            None => self
                .repository
                .get_latest_object(bucket_name, name)
                .await?
                .ok_or_else(|| StorageError::ObjectNotFound(name.to_string())),
        }
    }

    pub async fn list_objects(&self, bucket_name: &str, query: ListObjectsQuery) -> StorageResult<Vec<Object>> {
        self.get_bucket(bucket_name).await?;
        self.repository
            .list_objects(bucket_name, query.prefix.as_deref(), query.limit, query.versions)
            .await
    }

    /// Hard-deletes the object row and its bytes when the bucket has no
    /// versioning, along with any earlier generations `upload_object` had kept
    /// around for `?generation=N` pinning; otherwise only marks the latest row
    /// deleted and keeps the bytes, so a prior generation stays downloadable by
    /// its explicit generation number. Orphaned blobs from removed generations
    /// are reclaimed by the stale-file sweeper, not here.
    pub async fn delete_object(&self, bucket_name: &str, name: &str) -> StorageResult<()> {
        let bucket = self.get_bucket(bucket_name).await?;
        let deleted = self
            .repository
            .delete_object(bucket_name, name, bucket.versioning_enabled)
            .await?;

        let Some(object) = deleted else {
            return Err(StorageError::ObjectNotFound(name.to_string()));
        };

        if !bucket.versioning_enabled {
            self.byte_store.delete(std::path::Path::new(&object.file_path)).await?;
        }
        Ok(())
    }

    pub async fn get_default_object_acl(&self, bucket_name: &str) -> StorageResult<AclView> {
        let bucket = self.get_bucket(bucket_name).await?;
        Ok(AclView {
            entity: bucket.default_object_acl.as_str().to_string(),
        })
    }

    pub async fn update_default_object_acl(&self, bucket_name: &str, input: UpdateAcl) -> StorageResult<AclView> {
        input
            .validate()
            .map_err(|e| StorageError::InvalidArgument(e.to_string()))?;
        let acl = Acl::parse(&input.entity)
            .ok_or_else(|| StorageError::InvalidArgument(format!("unknown ACL entity '{}'", input.entity)))?;

        let mut bucket = self.get_bucket(bucket_name).await?;
        bucket.default_object_acl = acl;
        bucket.update_time = Utc::now();
        let bucket = self.repository.update_bucket(bucket).await?;
        Ok(AclView {
            entity: bucket.default_object_acl.as_str().to_string(),
        })
    }

    pub async fn get_acl(&self, bucket_name: &str, name: &str) -> StorageResult<AclView> {
        let object = self.resolve_object(bucket_name, name, None).await?;
        Ok(AclView {
            entity: object.acl.as_str().to_string(),
        })
    }

    pub async fn update_acl(&self, bucket_name: &str, name: &str, input: UpdateAcl) -> StorageResult<AclView> {
        input
            .validate()
            .map_err(|e| StorageError::InvalidArgument(e.to_string()))?;
        self.resolve_object(bucket_name, name, None).await?;

        let acl = Acl::parse(&input.entity)
            .ok_or_else(|| StorageError::InvalidArgument(format!("unknown ACL entity '{}'", input.entity)))?;
        let object = self.repository.update_object_acl(bucket_name, name, acl).await?;
        Ok(AclView {
            entity: object.acl.as_str().to_string(),
        })
    }

    /// Copies the source object's current bytes into a fresh blob under the
    /// destination bucket/name. `rewriteTo` is always reported `done = true`:
    /// every copy in this emulator completes within a single call.
    ///
    /// Routes through [`Self::upload_object`] rather than inserting the
    /// destination row at a hardcoded generation 1: when the destination key
    /// is fresh (the common case) this already yields generation 1, but when
    /// the destination already has a live object, reusing the same
    /// generation-bump path keeps the per-`(bucket, name)` monotonic-generation
    /// invariant intact instead of colliding with an existing generation 1 row.
    pub async fn rewrite_object(
        &self,
        src_bucket: &str,
        src_name: &str,
        dst_bucket: &str,
        dst_name: &str,
        self_link_base: &str,
    ) -> StorageResult<RewriteResponse> {
        let (source, bytes) = self.download_object(src_bucket, src_name, None).await?;
        let resource = self
            .upload_object(dst_bucket, dst_name, source.content_type.clone(), bytes)
            .await?;

        Ok(RewriteResponse {
            done: true,
            resource: ObjectView::from_object(&resource, self_link_base),
        })
    }

    /// Issues a signed-URL session. Tokens are 256 bits of randomness, base64
    /// URL-safe encoded; `expires_in` is already bounded to 7 days by
    /// [`SignedUrlRequest`]'s validator.
    pub async fn create_signed_url(
        &self,
        bucket_name: &str,
        name: &str,
        input: SignedUrlRequest,
    ) -> StorageResult<SignedUrlResponse> {
        input
            .validate()
            .map_err(|e| StorageError::InvalidArgument(e.to_string()))?;
        self.resolve_object(bucket_name, name, None).await?;

        let mut token_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut token_bytes);
        let token = BASE64_URL.encode(token_bytes);

        let now = Utc::now();
        let expires_at = now + ChronoDuration::seconds(input.expires_in);

        let session = SignedUrlSession {
            id: Uuid::now_v7(),
            token: token.clone(),
            bucket: bucket_name.to_string(),
            object_name: name.to_string(),
            method: input.method,
            expires_at,
            access_count: 0,
            create_time: now,
        };
        self.repository.create_signed_url_session(session).await?;

        Ok(SignedUrlResponse {
            signed_url: format!("{}/signed/{token}", self.signed_url_base),
            expires_at,
        })
    }

    /// Redeems a signed-URL token: 404s on an absent or expired session without
    /// distinguishing the two, so a token's validity window can't be probed.
    pub async fn redeem_signed_url(&self, token: &str) -> StorageResult<(Object, Vec<u8>)> {
        let session = self
            .repository
            .get_signed_url_session(token)
            .await?
            .ok_or(StorageError::SignedUrlNotFound)?;

        if session.expires_at <= Utc::now() {
            return Err(StorageError::SignedUrlNotFound);
        }

        let result = self.download_object(&session.bucket, &session.object_name, None).await;
        if result.is_ok() {
            self.repository.increment_access_count(token).await?;
        }
        result
    }

    /// Removes sessions past their expiry. Intended to run on a fixed interval
    /// from the composition root alongside [`Self::sweep_orphans`].
    pub async fn sweep_expired_sessions(&self) -> StorageResult<u64> {
        self.repository.delete_expired_sessions(Utc::now()).await
    }

    /// Removes blob files with no corresponding live metadata row: the remnant
    /// of deleted objects (their superseded generations included) and any
    /// upload that crashed after writing bytes but before its row was
    /// committed.
    pub async fn sweep_orphans(&self) -> StorageResult<usize> {
        let live_paths = self
            .repository
            .list_all_file_paths()
            .await?
            .into_iter()
            .map(std::path::PathBuf::from)
            .collect::<Vec<_>>();
        self.byte_store.sweep_orphans(&live_paths).await
    }

    /// Removes every bucket, object and signed-url session owned by a project.
    /// Blob files are reclaimed later by [`Self::sweep_orphans`] rather than
    /// deleted synchronously here. Used by project cascade-delete.
    pub async fn delete_all_for_project(&self, project_id: &str) -> StorageResult<Vec<Bucket>> {
        self.repository.delete_all_for_project(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStorageRepository;

    fn service() -> StorageService<InMemoryStorageRepository> {
        let base = std::env::temp_dir().join(format!("emulator-storage-svc-{}", Uuid::new_v4()));
        StorageService::new(
            InMemoryStorageRepository::new(),
            Arc::new(ByteStore::new(base)),
            "http://localhost:8080",
        )
    }

    #[tokio::test]
    async fn create_then_upload_then_download_round_trips() {
        let svc = service();
        svc.create_bucket(
            "demo",
            CreateBucket {
                name: "my-bucket".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: false,
            },
        )
        .await
        .unwrap();

        svc.upload_object("my-bucket", "hello.txt", "text/plain".to_string(), b"hi there".to_vec())
            .await
            .unwrap();

        let (object, bytes) = svc.download_object("my-bucket", "hello.txt", None).await.unwrap();
        assert_eq!(bytes, b"hi there");
        assert_eq!(object.generation, 1);
    }

    #[tokio::test]
    async fn delete_bucket_rejects_when_not_empty() {
        let svc = service();
        svc.create_bucket(
            "demo",
            CreateBucket {
                name: "full-bucket".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: false,
            },
        )
        .await
        .unwrap();
        svc.upload_object("full-bucket", "a.txt", "text/plain".to_string(), b"x".to_vec())
            .await
            .unwrap();

        let err = svc.delete_bucket("full-bucket").await.unwrap_err();
        assert!(matches!(err, StorageError::FailedPrecondition(_)));
    }

    #[tokio::test]
    async fn versioned_upload_keeps_previous_generation_readable() {
        let svc = service();
        svc.create_bucket(
            "demo",
            CreateBucket {
                name: "versioned".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: true,
            },
        )
        .await
        .unwrap();

        svc.upload_object("versioned", "o.txt", "text/plain".to_string(), b"v1".to_vec())
            .await
            .unwrap();
        svc.upload_object("versioned", "o.txt", "text/plain".to_string(), b"v2".to_vec())
            .await
            .unwrap();

        let (latest, bytes) = svc.download_object("versioned", "o.txt", None).await.unwrap();
        assert_eq!(latest.generation, 2);
        assert_eq!(bytes, b"v2");

        let (_, v1_bytes) = svc.download_object("versioned", "o.txt", Some(1)).await.unwrap();
        assert_eq!(v1_bytes, b"v1");
    }

    #[tokio::test]
    async fn non_versioned_upload_still_keeps_prior_generation_readable() {
        let svc = service();
        svc.create_bucket(
            "demo",
            CreateBucket {
                name: "b1".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: false,
            },
        )
        .await
        .unwrap();

        svc.upload_object("b1", "hello.txt", "text/plain".to_string(), b"hello".to_vec())
            .await
            .unwrap();
        svc.upload_object("b1", "hello.txt", "text/plain".to_string(), b"hello again".to_vec())
            .await
            .unwrap();

        let (latest, bytes) = svc.download_object("b1", "hello.txt", None).await.unwrap();
        assert_eq!(latest.generation, 2);
        assert_eq!(bytes, b"hello again");

        let (v1, v1_bytes) = svc.download_object("b1", "hello.txt", Some(1)).await.unwrap();
        assert_eq!(v1.generation, 1);
        assert_eq!(v1_bytes, b"hello");
    }

    #[tokio::test]
    async fn non_versioned_delete_removes_prior_generations_too() {
        let svc = service();
        svc.create_bucket(
            "demo",
            CreateBucket {
                name: "b1".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: false,
            },
        )
        .await
        .unwrap();

        svc.upload_object("b1", "hello.txt", "text/plain".to_string(), b"hello".to_vec())
            .await
            .unwrap();
        svc.upload_object("b1", "hello.txt", "text/plain".to_string(), b"hello again".to_vec())
            .await
            .unwrap();

        svc.delete_object("b1", "hello.txt").await.unwrap();

        let err = svc.download_object("b1", "hello.txt", None).await.unwrap_err();
        assert!(matches!(err, StorageError::ObjectNotFound(_)));
        let err = svc.download_object("b1", "hello.txt", Some(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::ObjectNotFound(_)));

        assert_eq!(svc.repository.count_live_objects("b1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn signed_url_redeems_once_and_rejects_unknown_token() {
        let svc = service();
        svc.create_bucket(
            "demo",
            CreateBucket {
                name: "b".to_string(),
                location: "US".to_string(),
                storage_class: "STANDARD".to_string(),
                versioning_enabled: false,
            },
        )
        .await
        .unwrap();
        svc.upload_object("b", "o.txt", "text/plain".to_string(), b"secret".to_vec())
            .await
            .unwrap();

        let signed = svc
            .create_signed_url(
                "b",
                "o.txt",
                SignedUrlRequest {
                    method: "GET".to_string(),
                    expires_in: 3600,
                },
            )
            .await
            .unwrap();
        let token = signed.signed_url.rsplit('/').next().unwrap();

        let (_, bytes) = svc.redeem_signed_url(token).await.unwrap();
        assert_eq!(bytes, b"secret");

        assert!(svc.redeem_signed_url("not-a-real-token").await.is_err());
    }

    #[tokio::test]
    async fn rewrite_object_copies_bytes_to_destination() {
        let svc = service();
        for name in ["src", "dst"] {
            svc.create_bucket(
                "demo",
                CreateBucket {
                    name: name.to_string(),
                    location: "US".to_string(),
                    storage_class: "STANDARD".to_string(),
                    versioning_enabled: false,
                },
            )
            .await
            .unwrap();
        }
        svc.upload_object("src", "o.txt", "text/plain".to_string(), b"payload".to_vec())
            .await
            .unwrap();

        let result = svc
            .rewrite_object("src", "o.txt", "dst", "copy.txt", "http://localhost:8080")
            .await
            .unwrap();
        assert!(result.done);

        let (_, bytes) = svc.download_object("dst", "copy.txt", None).await.unwrap();
        assert_eq!(bytes, b"payload");
    }
}
