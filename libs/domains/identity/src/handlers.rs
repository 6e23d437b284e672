use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
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

use crate::error::IdentityResult;
use crate::models::{CreateServiceAccount, ServiceAccount, ServiceAccountFilter};
use crate::repository::ServiceAccountRepository;
use crate::service::IdentityService;

/// OpenAPI documentation for the Identity Service
#[derive(OpenApi)]
#[openapi(
    paths(list_service_accounts, create_service_account, get_service_account, delete_service_account, list_keys),
    components(
        schemas(ServiceAccount, CreateServiceAccount, ServiceAccountFilter),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Identity", description = "Service accounts: iam.googleapis.com/v1/projects/{p}/serviceAccounts")
    )
)]
pub struct ApiDoc;

/// Mounted at `/v1/projects/{project_id}/serviceAccounts`.
pub fn router<R: ServiceAccountRepository + 'static>(service: IdentityService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/v1/projects/{project_id}/serviceAccounts",
            get(list_service_accounts).post(create_service_account),
        )
        .route(
            "/v1/projects/{project_id}/serviceAccounts/{email}",
            get(get_service_account).delete(delete_service_account),
        )
        .route(
            "/v1/projects/{project_id}/serviceAccounts/{email}/keys",
            get(list_keys),
        )
        .with_state(shared_service)
}

#[utoipa::path(
    get,
    path = "/v1/projects/{project_id}/serviceAccounts",
    tag = "Identity",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ServiceAccountFilter,
    ),
    responses(
        (status = 200, description = "List of service accounts", body = Vec<ServiceAccount>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_service_accounts<R: ServiceAccountRepository>(
    State(service): State<Arc<IdentityService<R>>>,
    Path(project_id): Path<String>,
    Query(filter): Query<ServiceAccountFilter>,
) -> IdentityResult<Json<Vec<ServiceAccount>>> {
    let accounts = service.list_service_accounts(&project_id, filter).await?;
    Ok(Json(accounts))
}

#[utoipa::path(
    post,
    path = "/v1/projects/{project_id}/serviceAccounts",
    tag = "Identity",
    params(
        ("project_id" = String, Path, description = "Project identifier")
    ),
    request_body = CreateServiceAccount,
    responses(
        (status = 201, description = "Service account created", body = ServiceAccount),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_service_account<R: ServiceAccountRepository>(
    State(service): State<Arc<IdentityService<R>>>,
    Path(project_id): Path<String>,
    ValidatedJson(input): ValidatedJson<CreateServiceAccount>,
) -> IdentityResult<impl IntoResponse> {
    let account = service.create_service_account(&project_id, input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    get,
    path = "/v1/projects/{project_id}/serviceAccounts/{email}",
    tag = "Identity",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("email" = String, Path, description = "Service account email")
    ),
    responses(
        (status = 200, description = "Service account found", body = ServiceAccount),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_service_account<R: ServiceAccountRepository>(
    State(service): State<Arc<IdentityService<R>>>,
    Path((_project_id, email)): Path<(String, String)>,
) -> IdentityResult<Json<ServiceAccount>> {
    let account = service.get_service_account(&email).await?;
    Ok(Json(account))
}

#[utoipa::path(
    delete,
    path = "/v1/projects/{project_id}/serviceAccounts/{email}",
    tag = "Identity",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("email" = String, Path, description = "Service account email")
    ),
    responses(
        (status = 204, description = "Service account deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_service_account<R: ServiceAccountRepository>(
    State(service): State<Arc<IdentityService<R>>>,
    Path((_project_id, email)): Path<(String, String)>,
) -> IdentityResult<impl IntoResponse> {
    service.delete_service_account(&email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Key material is never emulated; always returns an empty list.
#[utoipa::path(
    get,
    path = "/v1/projects/{project_id}/serviceAccounts/{email}/keys",
    tag = "Identity",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("email" = String, Path, description = "Service account email")
    ),
    responses(
        (status = 200, description = "Always empty", body = Vec<String>)
    )
)]
async fn list_keys<R: ServiceAccountRepository>(
    State(service): State<Arc<IdentityService<R>>>,
    Path((_project_id, email)): Path<(String, String)>,
) -> Json<Vec<()>> {
    Json(service.list_keys(&email))
}
