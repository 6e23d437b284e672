use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, Path, Query, Request, State},
    http::{
        HeaderName, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, ETAG},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{StorageError, StorageResult};
use crate::models::{
    AclView, Bucket, BucketFilter, BucketView, CreateBucket, ListObjectsQuery, Object, ObjectQuery,
    ObjectView, RewriteResponse, SignedUrlRequest, SignedUrlResponse, UpdateAcl, UpdateBucket,
};
use crate::repository::StorageRepository;
use crate::service::StorageService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_buckets, create_bucket, get_bucket, update_bucket, delete_bucket,
        list_objects, get_object_metadata, delete_object,
        upload_object, download_object,
        rewrite_object,
        get_acl, update_acl,
        get_default_object_acl, update_default_object_acl,
        create_signed_url,
    ),
    components(
        schemas(
            Bucket, BucketView, CreateBucket, UpdateBucket, BucketFilter,
            ObjectView, ListObjectsQuery, ObjectQuery, RewriteResponse,
            AclView, UpdateAcl, SignedUrlRequest, SignedUrlResponse,
        ),
        responses(NotFoundResponse, BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Storage", description = "storage.googleapis.com/storage/v1/b")
    )
)]
pub struct ApiDoc;

#[derive(serde::Deserialize)]
struct ProjectQuery {
    project: Option<String>,
}

#[derive(serde::Deserialize)]
struct UploadQuery {
    name: Option<String>,
}

/// Mounted at the cloud's `/storage/v1`, `/upload/storage/v1`, `/download/storage/v1`
/// and a bare `/signed` path for redeeming signed-URL tokens.
pub fn router<R: StorageRepository + 'static>(service: StorageService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/storage/v1/b", get(list_buckets).post(create_bucket))
        .route(
            "/storage/v1/b/{bucket}",
            get(get_bucket).patch(update_bucket).delete(delete_bucket),
        )
        .route("/storage/v1/b/{bucket}/o", get(list_objects))
        .route(
            "/storage/v1/b/{bucket}/o/{name}",
            get(get_object_metadata).delete(delete_object),
        )
        .route("/storage/v1/b/{bucket}/o/{name}/acl", get(get_acl).put(update_acl))
        .route(
            "/storage/v1/b/{bucket}/defaultObjectAcl",
            get(get_default_object_acl).patch(update_default_object_acl),
        )
        .route(
            "/storage/v1/b/{src_bucket}/o/{src_name}/rewriteTo/b/{dst_bucket}/o/{dst_name}",
            post(rewrite_object),
        )
        .route(
            "/storage/v1/b/{bucket}/o/{name}/signedUrl",
            post(create_signed_url),
        )
        .route("/upload/storage/v1/b/{bucket}/o", post(upload_object))
        .route("/download/storage/v1/b/{bucket}/o/{name}", get(download_object))
        .route("/signed/{token}", get(redeem_signed_url))
        .with_state(shared_service)
}

#[utoipa::path(
    get,
    path = "/storage/v1/b",
    tag = "Storage",
    params(("project" = Option<String>, Query, description = "Owning project id"), BucketFilter),
    responses((status = 200, description = "List of buckets", body = Vec<BucketView>))
)]
async fn list_buckets<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Query(project): Query<ProjectQuery>,
    Query(filter): Query<BucketFilter>,
) -> StorageResult<Json<Vec<BucketView>>> {
    let project_id = project.project.unwrap_or_default();
    let buckets = service.list_buckets(&project_id, filter).await?;
    let base = service.self_link_base().to_string();
    Ok(Json(buckets.iter().map(|b| BucketView::from_bucket(b, &base)).collect()))
}

#[utoipa::path(
    post,
    path = "/storage/v1/b",
    tag = "Storage",
    params(("project" = Option<String>, Query, description = "Owning project id")),
    request_body = CreateBucket,
    responses(
        (status = 200, description = "Bucket created", body = BucketView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn create_bucket<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Query(project): Query<ProjectQuery>,
    ValidatedJson(input): ValidatedJson<CreateBucket>,
) -> StorageResult<impl IntoResponse> {
    let project_id = project.project.unwrap_or_default();
    let bucket = service.create_bucket(&project_id, input).await?;
    let base = service.self_link_base().to_string();
    Ok((StatusCode::OK, Json(BucketView::from_bucket(&bucket, &base))))
}

#[utoipa::path(
    get,
    path = "/storage/v1/b/{bucket}",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name")),
    responses((status = 200, description = "Bucket found", body = BucketView), (status = 404, response = NotFoundResponse))
)]
async fn get_bucket<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(bucket): Path<String>,
) -> StorageResult<Json<BucketView>> {
    let bucket = service.get_bucket(&bucket).await?;
    let base = service.self_link_base().to_string();
    Ok(Json(BucketView::from_bucket(&bucket, &base)))
}

#[utoipa::path(
    patch,
    path = "/storage/v1/b/{bucket}",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name")),
    request_body = UpdateBucket,
    responses((status = 200, description = "Bucket updated", body = BucketView), (status = 404, response = NotFoundResponse))
)]
async fn update_bucket<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(bucket): Path<String>,
    Json(input): Json<UpdateBucket>,
) -> StorageResult<Json<BucketView>> {
    let bucket = service.update_bucket(&bucket, input).await?;
    let base = service.self_link_base().to_string();
    Ok(Json(BucketView::from_bucket(&bucket, &base)))
}

#[utoipa::path(
    delete,
    path = "/storage/v1/b/{bucket}",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name")),
    responses((status = 204, description = "Bucket deleted"), (status = 404, response = NotFoundResponse))
)]
async fn delete_bucket<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(bucket): Path<String>,
) -> StorageResult<impl IntoResponse> {
    service.delete_bucket(&bucket).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/storage/v1/b/{bucket}/o",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name"), ListObjectsQuery),
    responses((status = 200, description = "List of objects", body = Vec<ObjectView>))
)]
async fn list_objects<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(bucket): Path<String>,
    Query(query): Query<ListObjectsQuery>,
) -> StorageResult<Json<Vec<ObjectView>>> {
    let objects = service.list_objects(&bucket, query).await?;
    let base = service.self_link_base().to_string();
    Ok(Json(objects.iter().map(|o| ObjectView::from_object(o, &base)).collect()))
}

#[utoipa::path(
    get,
    path = "/storage/v1/b/{bucket}/o/{name}",
    tag = "Storage",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("name" = String, Path, description = "Object name"),
        ObjectQuery,
    ),
    responses((status = 200, description = "Object metadata", body = ObjectView), (status = 404, response = NotFoundResponse))
)]
async fn get_object_metadata<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path((bucket, name)): Path<(String, String)>,
    Query(mut query): Query<ObjectQuery>,
) -> StorageResult<Response> {
    query.name = Some(name.clone());
    if query.alt.as_deref() == Some("media") {
        let (object, bytes) = service.download_object(&bucket, &name, query.generation).await?;
        return Ok(media_response(&object, bytes));
    }
    let object = service.get_object_metadata(&bucket, &query).await?;
    let base = service.self_link_base().to_string();
    Ok(Json(ObjectView::from_object(&object, &base)).into_response())
}

#[utoipa::path(
    delete,
    path = "/storage/v1/b/{bucket}/o/{name}",
    tag = "Storage",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("name" = String, Path, description = "Object name"),
    ),
    responses((status = 204, description = "Object deleted"), (status = 404, response = NotFoundResponse))
)]
async fn delete_object<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path((bucket, name)): Path<(String, String)>,
) -> StorageResult<impl IntoResponse> {
    service.delete_object(&bucket, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accepts either a raw `uploadType=media` body (Content-Type is the object's
/// media type) or a `multipart/related` body whose first part is a JSON
/// metadata document (`{"name": "..."}`) and whose second part is the bytes,
/// matching the two upload shapes real client libraries send.
#[utoipa::path(
    post,
    path = "/upload/storage/v1/b/{bucket}/o",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name"), ("name" = Option<String>, Query, description = "Object name for a media upload")),
    responses(
        (status = 200, description = "Object uploaded", body = ObjectView),
        (status = 400, response = BadRequestValidationResponse),
    )
)]
async fn upload_object<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(bucket): Path<String>,
    Query(query): Query<UploadQuery>,
    request: Request,
) -> StorageResult<impl IntoResponse> {
    let content_type_header = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let (name, content_type, bytes) = if content_type_header.starts_with("multipart/") {
        read_multipart_upload(request, query.name).await?
    } else {
        let name = query
            .name
            .ok_or_else(|| StorageError::InvalidArgument("name query parameter is required".to_string()))?;
        let body = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .map_err(|e| StorageError::InvalidArgument(format!("failed to read upload body: {e}")))?;
        (name, content_type_header, body.to_vec())
    };

    let object = service.upload_object(&bucket, &name, content_type, bytes).await?;
    let base = service.self_link_base().to_string();
    Ok((StatusCode::OK, Json(ObjectView::from_object(&object, &base))))
}

async fn read_multipart_upload(
    request: Request,
    fallback_name: Option<String>,
) -> StorageResult<(String, String, Vec<u8>)> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| StorageError::InvalidArgument(format!("invalid multipart body: {e}")))?;

    let mut name = fallback_name;
    let mut content_type = "application/octet-stream".to_string();
    let mut data: Vec<u8> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StorageError::InvalidArgument(format!("invalid multipart field: {e}")))?
    {
        let field_content_type = field.content_type().map(str::to_string);
        if field_content_type.as_deref() == Some("application/json") {
            let meta = field
                .bytes()
                .await
                .map_err(|e| StorageError::InvalidArgument(format!("invalid multipart metadata: {e}")))?;
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&meta) {
                if let Some(found_name) = value.get("name").and_then(|v| v.as_str()) {
                    name = Some(found_name.to_string());
                }
            }
        } else {
            if let Some(ct) = field_content_type {
                content_type = ct;
            }
            data = field
                .bytes()
                .await
                .map_err(|e| StorageError::InvalidArgument(format!("invalid multipart payload: {e}")))?
                .to_vec();
        }
    }

    let name = name.ok_or_else(|| StorageError::InvalidArgument("object name was not provided".to_string()))?;
    Ok((name, content_type, data))
}

#[utoipa::path(
    get,
    path = "/download/storage/v1/b/{bucket}/o/{name}",
    tag = "Storage",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("name" = String, Path, description = "Object name"),
        ObjectQuery,
    ),
    responses((status = 200, description = "Object bytes"), (status = 404, response = NotFoundResponse))
)]
async fn download_object<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path((bucket, name)): Path<(String, String)>,
    Query(query): Query<ObjectQuery>,
) -> StorageResult<Response> {
    let (object, bytes) = service.download_object(&bucket, &name, query.generation).await?;
    Ok(media_response(&object, bytes))
}

fn media_response(object: &Object, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, object.content_type.clone()),
            (CONTENT_LENGTH, bytes.len().to_string()),
            (ETAG, format!("\"{}\"", object.md5_base64)),
            (
                HeaderName::from_static("x-goog-hash"),
                format!("crc32c={},md5={}", object.crc32c_base64, object.md5_base64),
            ),
            (
                HeaderName::from_static("x-goog-generation"),
                object.generation.to_string(),
            ),
            (
                HeaderName::from_static("x-goog-metageneration"),
                object.metageneration.to_string(),
            ),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", object.name),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/storage/v1/b/{src_bucket}/o/{src_name}/rewriteTo/b/{dst_bucket}/o/{dst_name}",
    tag = "Storage",
    params(
        ("src_bucket" = String, Path, description = "Source bucket"),
        ("src_name" = String, Path, description = "Source object name"),
        ("dst_bucket" = String, Path, description = "Destination bucket"),
        ("dst_name" = String, Path, description = "Destination object name"),
    ),
    responses((status = 200, description = "Copy complete", body = RewriteResponse), (status = 404, response = NotFoundResponse))
)]
async fn rewrite_object<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path((src_bucket, src_name, dst_bucket, dst_name)): Path<(String, String, String, String)>,
) -> StorageResult<Json<RewriteResponse>> {
    let base = service.self_link_base().to_string();
    let result = service
        .rewrite_object(&src_bucket, &src_name, &dst_bucket, &dst_name, &base)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/storage/v1/b/{bucket}/o/{name}/acl",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name"), ("name" = String, Path, description = "Object name")),
    responses((status = 200, description = "Object ACL", body = AclView), (status = 404, response = NotFoundResponse))
)]
async fn get_acl<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path((bucket, name)): Path<(String, String)>,
) -> StorageResult<Json<AclView>> {
    Ok(Json(service.get_acl(&bucket, &name).await?))
}

#[utoipa::path(
    put,
    path = "/storage/v1/b/{bucket}/o/{name}/acl",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name"), ("name" = String, Path, description = "Object name")),
    request_body = UpdateAcl,
    responses((status = 200, description = "Object ACL updated", body = AclView), (status = 404, response = NotFoundResponse))
)]
async fn update_acl<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path((bucket, name)): Path<(String, String)>,
    ValidatedJson(input): ValidatedJson<UpdateAcl>,
) -> StorageResult<Json<AclView>> {
    Ok(Json(service.update_acl(&bucket, &name, input).await?))
}

#[utoipa::path(
    get,
    path = "/storage/v1/b/{bucket}/defaultObjectAcl",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name")),
    responses((status = 200, description = "Bucket's default object ACL", body = AclView), (status = 404, response = NotFoundResponse))
)]
async fn get_default_object_acl<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(bucket): Path<String>,
) -> StorageResult<Json<AclView>> {
    Ok(Json(service.get_default_object_acl(&bucket).await?))
}

#[utoipa::path(
    patch,
    path = "/storage/v1/b/{bucket}/defaultObjectAcl",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name")),
    request_body = UpdateAcl,
    responses((status = 200, description = "Default object ACL updated", body = AclView), (status = 404, response = NotFoundResponse))
)]
async fn update_default_object_acl<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(bucket): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateAcl>,
) -> StorageResult<Json<AclView>> {
    Ok(Json(service.update_default_object_acl(&bucket, input).await?))
}

#[utoipa::path(
    post,
    path = "/storage/v1/b/{bucket}/o/{name}/signedUrl",
    tag = "Storage",
    params(("bucket" = String, Path, description = "Bucket name"), ("name" = String, Path, description = "Object name")),
    request_body = SignedUrlRequest,
    responses(
        (status = 200, description = "Signed URL issued", body = SignedUrlResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
    )
)]
async fn create_signed_url<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path((bucket, name)): Path<(String, String)>,
    ValidatedJson(input): ValidatedJson<SignedUrlRequest>,
) -> StorageResult<Json<SignedUrlResponse>> {
    Ok(Json(service.create_signed_url(&bucket, &name, input).await?))
}

async fn redeem_signed_url<R: StorageRepository>(
    State(service): State<Arc<StorageService<R>>>,
    Path(token): Path<String>,
) -> StorageResult<Response> {
    let (object, bytes) = service.redeem_signed_url(&token).await?;
    Ok(media_response(&object, bytes))
}
