//! Storage domain
//!
//! Implements `storage.googleapis.com/storage/v1/b` (buckets and objects),
//! the `/upload` and `/download` media endpoints, object ACLs, `rewriteTo`
//! copies, and signed URLs. Object bytes live on local disk through
//! [`byte_store::ByteStore`]; only metadata is kept in the database.

pub mod byte_store;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use byte_store::{ByteStore, Digests};
pub use error::{StorageError, StorageResult};
pub use handlers::ApiDoc;
pub use models::{
    Acl, Bucket, BucketFilter, BucketView, CreateBucket, ListObjectsQuery, Object, ObjectQuery,
    ObjectView, RewriteResponse, SignedUrlRequest, SignedUrlResponse, SignedUrlSession,
    UpdateAcl, UpdateBucket,
};
pub use postgres::PgStorageRepository;
pub use repository::{InMemoryStorageRepository, StorageRepository};
pub use service::StorageService;
