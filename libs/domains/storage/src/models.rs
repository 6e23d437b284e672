use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use regex::Regex;

static BUCKET_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]{1,61}[a-z0-9]$").unwrap());

fn validate_bucket_name(name: &str) -> Result<(), validator::ValidationError> {
    if !BUCKET_NAME_PATTERN.is_match(name) {
        return Err(validator::ValidationError::new("invalid_bucket_name"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Acl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
}

impl Default for Acl {
    fn default() -> Self {
        Acl::Private
    }
}

impl Acl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
            Acl::PublicReadWrite => "public-read-write",
            Acl::AuthenticatedRead => "authenticated-read",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Acl::Private),
            "public-read" => Some(Acl::PublicRead),
            "public-read-write" => Some(Acl::PublicReadWrite),
            "authenticated-read" => Some(Acl::AuthenticatedRead),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bucket {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub project_id: String,
    pub name: String,
    pub location: String,
    pub storage_class: String,
    pub versioning_enabled: bool,
    pub default_object_acl: Acl,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Wire shape for a bucket resource, using the cloud's own field names.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BucketView {
    pub kind: &'static str,
    pub id: String,
    #[serde(rename = "selfLink")]
    pub self_link: String,
    pub name: String,
    #[serde(rename = "projectNumber")]
    pub project_number: String,
    pub location: String,
    #[serde(rename = "storageClass")]
    pub storage_class: String,
    pub versioning: VersioningView,
    #[serde(rename = "timeCreated")]
    pub time_created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersioningView {
    pub enabled: bool,
}

impl BucketView {
    pub fn from_bucket(bucket: &Bucket, self_link_base: &str) -> Self {
        Self {
            kind: "storage#bucket",
            id: bucket.name.clone(),
            self_link: format!("{self_link_base}/storage/v1/b/{}", bucket.name),
            name: bucket.name.clone(),
            project_number: bucket.project_id.clone(),
            location: bucket.location.clone(),
            storage_class: bucket.storage_class.clone(),
            versioning: VersioningView {
                enabled: bucket.versioning_enabled,
            },
            time_created: bucket.create_time,
            updated: bucket.update_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBucket {
    #[validate(custom(function = "validate_bucket_name"))]
    pub name: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_storage_class", rename = "storageClass")]
    pub storage_class: String,
    #[serde(default)]
    pub versioning_enabled: bool,
}

fn default_location() -> String {
    "US".to_string()
}

fn default_storage_class() -> String {
    "STANDARD".to_string()
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateBucket {
    pub versioning_enabled: Option<bool>,
    pub default_object_acl: Option<Acl>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct BucketFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for BucketFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> usize {
    100
}

/// Key is `(bucket, name, generation)`. Exactly one row per `(bucket, name)` may
/// have `is_latest = true && deleted = false`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Object {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub bucket: String,
    pub name: String,
    pub generation: i64,
    pub size: i64,
    pub content_type: String,
    pub md5_base64: String,
    pub crc32c_base64: String,
    pub file_path: String,
    pub metageneration: i64,
    pub storage_class: String,
    pub acl: Acl,
    pub is_latest: bool,
    pub deleted: bool,
    pub create_time: DateTime<Utc>,
}

/// Wire shape for an object resource.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ObjectView {
    pub kind: &'static str,
    pub id: String,
    #[serde(rename = "selfLink")]
    pub self_link: String,
    pub name: String,
    pub bucket: String,
    pub generation: String,
    pub metageneration: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub size: String,
    #[serde(rename = "md5Hash")]
    pub md5_hash: String,
    pub crc32c: String,
    #[serde(rename = "timeCreated")]
    pub time_created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(rename = "storageClass")]
    pub storage_class: String,
}

impl ObjectView {
    pub fn from_object(object: &Object, self_link_base: &str) -> Self {
        Self {
            kind: "storage#object",
            id: format!("{}/{}/{}", object.bucket, object.name, object.generation),
            self_link: format!(
                "{self_link_base}/storage/v1/b/{}/o/{}",
                object.bucket, object.name
            ),
            name: object.name.clone(),
            bucket: object.bucket.clone(),
            generation: object.generation.to_string(),
            metageneration: object.metageneration.to_string(),
            content_type: object.content_type.clone(),
            size: object.size.to_string(),
            md5_hash: object.md5_base64.clone(),
            crc32c: object.crc32c_base64.clone(),
            time_created: object.create_time,
            updated: object.create_time,
            storage_class: object.storage_class.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ObjectQuery {
    pub name: Option<String>,
    pub generation: Option<i64>,
    pub alt: Option<String>,
    #[serde(default)]
    pub versions: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ListObjectsQuery {
    pub prefix: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// When true, include every generation (not just the live `is_latest` row)
    /// for each name, matching the cloud's `?versions=true` listing mode.
    #[serde(default)]
    pub versions: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAcl {
    #[validate(custom(function = "validate_acl_value"))]
    pub entity: String,
}

fn validate_acl_value(value: &str) -> Result<(), validator::ValidationError> {
    if Acl::parse(value).is_none() {
        return Err(validator::ValidationError::new("invalid_acl"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AclView {
    pub entity: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignedUrlRequest {
    #[validate(custom(function = "validate_signed_url_method"))]
    pub method: String,
    #[validate(range(min = 1, max = 604_800))]
    pub expires_in: i64,
}

fn validate_signed_url_method(method: &str) -> Result<(), validator::ValidationError> {
    if method != "GET" {
        return Err(validator::ValidationError::new("unsupported_method"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignedUrlResponse {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewriteResponse {
    pub done: bool,
    pub resource: ObjectView,
}

#[derive(Debug, Clone)]
pub struct SignedUrlSession {
    pub id: Uuid,
    pub token: String,
    pub bucket: String,
    pub object_name: String,
    pub method: String,
    pub expires_at: DateTime<Utc>,
    pub access_count: i64,
    pub create_time: DateTime<Utc>,
}

impl Bucket {
    pub fn new(project_id: &str, input: &CreateBucket) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            project_id: project_id.to_string(),
            name: input.name.clone(),
            location: input.location.clone(),
            storage_class: input.storage_class.clone(),
            versioning_enabled: input.versioning_enabled,
            default_object_acl: Acl::Private,
            create_time: now,
            update_time: now,
        }
    }
}

impl Object {
    pub fn new(bucket: &str, name: &str, generation: i64, file_path: &str, content_type: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            bucket: bucket.to_string(),
            name: name.to_string(),
            generation,
            size: 0,
            content_type: content_type.to_string(),
            md5_base64: String::new(),
            crc32c_base64: String::new(),
            file_path: file_path.to_string(),
            metageneration: 1,
            storage_class: "STANDARD".to_string(),
            acl: Acl::Private,
            is_latest: true,
            deleted: false,
            create_time: Utc::now(),
        }
    }
}
