use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use domain_networks::NetworkRepository;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ComputeResult;
use crate::models::{CreateInstance, InstanceFilter, InstanceView, MachineType, Zone};
use crate::repository::InstanceRepository;
use crate::service::{to_view, InstanceService};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_zones, get_zone, list_machine_types, get_machine_type,
        list_instances, create_instance, get_instance, delete_instance,
        start_instance, stop_instance, wait_operation,
    ),
    components(
        schemas(Zone, MachineType, InstanceView, CreateInstance, InstanceFilter, Operation),
        responses(NotFoundResponse, BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Compute", description = "compute.googleapis.com/compute/v1/projects/{p}/zones/{z}/instances")
    )
)]
pub struct ApiDoc;

/// A synchronously-completed long-running operation. Every compute mutation
/// in this emulator finishes before the HTTP response is sent, so `wait`
/// always returns `DONE` immediately.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Operation {
    pub name: String,
    pub status: String,
}

/// Mounted at the `/compute/v1/projects/{project_id}/zones/...` family of paths.
pub fn router<R: InstanceRepository + 'static, NR: NetworkRepository + 'static>(
    service: InstanceService<R, NR>,
) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/compute/v1/projects/{project_id}/zones", get(list_zones))
        .route("/compute/v1/projects/{project_id}/zones/{zone}", get(get_zone))
        .route(
            "/compute/v1/projects/{project_id}/zones/{zone}/machineTypes",
            get(list_machine_types),
        )
        .route(
            "/compute/v1/projects/{project_id}/zones/{zone}/machineTypes/{machine_type}",
            get(get_machine_type),
        )
        .route(
            "/compute/v1/projects/{project_id}/zones/{zone}/instances",
            get(list_instances).post(create_instance),
        )
        .route(
            "/compute/v1/projects/{project_id}/zones/{zone}/instances/{instance}",
            get(get_instance).delete(delete_instance),
        )
        .route(
            "/compute/v1/projects/{project_id}/zones/{zone}/instances/{instance}/start",
            post(start_instance),
        )
        .route(
            "/compute/v1/projects/{project_id}/zones/{zone}/instances/{instance}/stop",
            post(stop_instance),
        )
        .route(
            "/compute/v1/projects/{project_id}/zones/{zone}/operations/{operation}/wait",
            post(wait_operation),
        )
        .with_state(shared_service)
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/zones",
    tag = "Compute",
    params(("project_id" = String, Path, description = "Project identifier")),
    responses((status = 200, description = "Static zone catalog", body = Vec<Zone>))
)]
async fn list_zones<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path(_project_id): Path<String>,
) -> Json<Vec<Zone>> {
    Json(service.list_zones())
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/zones/{zone}",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name")
    ),
    responses((status = 200, description = "Zone found", body = Zone), (status = 404, response = NotFoundResponse))
)]
async fn get_zone<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((_project_id, zone)): Path<(String, String)>,
) -> ComputeResult<Json<Zone>> {
    Ok(Json(service.get_zone(&zone)?))
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/machineTypes",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name")
    ),
    responses((status = 200, description = "Static machine-type catalog for the zone", body = Vec<MachineType>))
)]
async fn list_machine_types<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((_project_id, zone)): Path<(String, String)>,
) -> Json<Vec<MachineType>> {
    Json(service.list_machine_types(&zone))
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/machineTypes/{machine_type}",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name"),
        ("machine_type" = String, Path, description = "Machine type name")
    ),
    responses((status = 200, description = "Machine type found", body = MachineType), (status = 404, response = NotFoundResponse))
)]
async fn get_machine_type<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((_project_id, zone, machine_type)): Path<(String, String, String)>,
) -> ComputeResult<Json<MachineType>> {
    Ok(Json(service.get_machine_type(&zone, &machine_type)?))
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/instances",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name"),
        InstanceFilter
    ),
    responses((status = 200, description = "List of instances", body = Vec<InstanceView>))
)]
async fn list_instances<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((project_id, zone)): Path<(String, String)>,
    Query(filter): Query<InstanceFilter>,
) -> ComputeResult<Json<Vec<InstanceView>>> {
    let instances = service.list_instances(&project_id, &zone, filter).await?;
    Ok(Json(instances.iter().map(to_view).collect()))
}

#[utoipa::path(
    post,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/instances",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name")
    ),
    request_body = CreateInstance,
    responses(
        (status = 201, description = "Instance created", body = InstanceView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn create_instance<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((project_id, zone)): Path<(String, String)>,
    ValidatedJson(input): ValidatedJson<CreateInstance>,
) -> ComputeResult<impl IntoResponse> {
    let instance = service.create_instance(&project_id, &zone, input).await?;
    Ok((StatusCode::CREATED, Json(to_view(&instance))))
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/instances/{instance}",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name"),
        ("instance" = String, Path, description = "Instance name")
    ),
    responses((status = 200, description = "Instance found", body = InstanceView), (status = 404, response = NotFoundResponse))
)]
async fn get_instance<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((project_id, zone, instance)): Path<(String, String, String)>,
) -> ComputeResult<Json<InstanceView>> {
    let instance = service.get_instance(&project_id, &zone, &instance).await?;
    Ok(Json(to_view(&instance)))
}

#[utoipa::path(
    delete,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/instances/{instance}",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name"),
        ("instance" = String, Path, description = "Instance name")
    ),
    responses((status = 204, description = "Instance deleted"), (status = 404, response = NotFoundResponse))
)]
async fn delete_instance<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((project_id, zone, instance)): Path<(String, String, String)>,
) -> ComputeResult<impl IntoResponse> {
    service.delete_instance(&project_id, &zone, &instance).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/instances/{instance}/start",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name"),
        ("instance" = String, Path, description = "Instance name")
    ),
    responses((status = 200, description = "Instance started", body = InstanceView), (status = 404, response = NotFoundResponse))
)]
async fn start_instance<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((project_id, zone, instance)): Path<(String, String, String)>,
) -> ComputeResult<Json<InstanceView>> {
    let instance = service.start_instance(&project_id, &zone, &instance).await?;
    Ok(Json(to_view(&instance)))
}

#[utoipa::path(
    post,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/instances/{instance}/stop",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name"),
        ("instance" = String, Path, description = "Instance name")
    ),
    responses((status = 200, description = "Instance stopped", body = InstanceView), (status = 404, response = NotFoundResponse))
)]
async fn stop_instance<R: InstanceRepository, NR: NetworkRepository>(
    State(service): State<Arc<InstanceService<R, NR>>>,
    Path((project_id, zone, instance)): Path<(String, String, String)>,
) -> ComputeResult<Json<InstanceView>> {
    let instance = service.stop_instance(&project_id, &zone, &instance).await?;
    Ok(Json(to_view(&instance)))
}

/// Every mutation above already runs to completion synchronously, so the wait
/// endpoint that clients poll for long-running-operation completion always
/// reports `DONE` on its first call.
#[utoipa::path(
    post,
    path = "/compute/v1/projects/{project_id}/zones/{zone}/operations/{operation}/wait",
    tag = "Compute",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("zone" = String, Path, description = "Zone name"),
        ("operation" = String, Path, description = "Operation name")
    ),
    responses((status = 200, description = "Operation status", body = Operation))
)]
async fn wait_operation<R: InstanceRepository, NR: NetworkRepository>(
    State(_service): State<Arc<InstanceService<R, NR>>>,
    Path((_project_id, _zone, operation)): Path<(String, String, String)>,
) -> Json<Operation> {
    Json(Operation {
        name: operation,
        status: "DONE".to_string(),
    })
}
