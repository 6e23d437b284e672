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

use crate::error::NetworkResult;
use crate::models::{
    CreateNetwork, CreateRoute, CreateSubnet, InternetGateway, Network, NetworkFilter, Route,
    Subnet, UpdateRoute,
};
use crate::repository::NetworkRepository;
use crate::service::NetworkService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_networks, create_network, get_network, delete_network,
        list_subnets, create_subnet, get_subnet, delete_subnet,
        list_routes, create_route, get_route, update_route, delete_route,
        get_internet_gateway, list_internet_gateways,
    ),
    components(
        schemas(Network, CreateNetwork, NetworkFilter, Subnet, CreateSubnet, Route, CreateRoute, UpdateRoute, InternetGateway),
        responses(NotFoundResponse, BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Networks", description = "compute.googleapis.com/compute/v1/projects/{p}/global/networks")
    )
)]
pub struct ApiDoc;

/// Mounted at the `/compute/v1/projects/{project_id}/...` family of paths.
pub fn router<R: NetworkRepository + 'static>(service: NetworkService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/compute/v1/projects/{project_id}/global/networks",
            get(list_networks).post(create_network),
        )
        .route(
            "/compute/v1/projects/{project_id}/global/networks/{network}",
            get(get_network).delete(delete_network),
        )
        .route(
            "/compute/v1/projects/{project_id}/regions/{region}/subnetworks",
            get(list_subnets).post(create_subnet),
        )
        .route(
            "/compute/v1/projects/{project_id}/regions/{region}/subnetworks/{subnetwork}",
            get(get_subnet).delete(delete_subnet),
        )
        .route(
            "/compute/v1/projects/{project_id}/global/routes",
            get(list_routes).post(create_route),
        )
        .route(
            "/compute/v1/projects/{project_id}/global/routes/{route}",
            get(get_route).patch(update_route).delete(delete_route),
        )
        .route(
            "/compute/v1/projects/{project_id}/global/internetGateways",
            get(list_internet_gateways),
        )
        .route(
            "/compute/v1/projects/{project_id}/global/internetGateways/{gateway}",
            get(get_internet_gateway),
        )
        .with_state(shared_service)
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/global/networks",
    tag = "Networks",
    params(("project_id" = String, Path, description = "Project identifier"), NetworkFilter),
    responses((status = 200, description = "List of networks", body = Vec<Network>))
)]
async fn list_networks<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path(project_id): Path<String>,
    Query(filter): Query<NetworkFilter>,
) -> NetworkResult<Json<Vec<Network>>> {
    Ok(Json(service.list_networks(&project_id, filter).await?))
}

#[utoipa::path(
    post,
    path = "/compute/v1/projects/{project_id}/global/networks",
    tag = "Networks",
    params(("project_id" = String, Path, description = "Project identifier")),
    request_body = CreateNetwork,
    responses(
        (status = 201, description = "Network created", body = Network),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn create_network<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path(project_id): Path<String>,
    ValidatedJson(input): ValidatedJson<CreateNetwork>,
) -> NetworkResult<impl IntoResponse> {
    let network = service.create_network(&project_id, input).await?;
    Ok((StatusCode::CREATED, Json(network)))
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/global/networks/{network}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("network" = String, Path, description = "Network name")
    ),
    responses((status = 200, description = "Network found", body = Network), (status = 404, response = NotFoundResponse))
)]
async fn get_network<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, network)): Path<(String, String)>,
) -> NetworkResult<Json<Network>> {
    Ok(Json(service.get_network(&project_id, &network).await?))
}

#[utoipa::path(
    delete,
    path = "/compute/v1/projects/{project_id}/global/networks/{network}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("network" = String, Path, description = "Network name")
    ),
    responses((status = 204, description = "Network deleted"), (status = 404, response = NotFoundResponse))
)]
async fn delete_network<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, network)): Path<(String, String)>,
) -> NetworkResult<impl IntoResponse> {
    service.delete_network(&project_id, &network).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/regions/{region}/subnetworks",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("region" = String, Path, description = "Region name")
    ),
    responses((status = 200, description = "List of subnetworks", body = Vec<Subnet>))
)]
async fn list_subnets<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, region)): Path<(String, String)>,
) -> NetworkResult<Json<Vec<Subnet>>> {
    Ok(Json(service.list_subnets(&project_id, &region).await?))
}

#[utoipa::path(
    post,
    path = "/compute/v1/projects/{project_id}/regions/{region}/subnetworks",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("region" = String, Path, description = "Region name")
    ),
    request_body = CreateSubnet,
    responses(
        (status = 201, description = "Subnetwork created", body = Subnet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn create_subnet<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, region)): Path<(String, String)>,
    ValidatedJson(input): ValidatedJson<CreateSubnet>,
) -> NetworkResult<impl IntoResponse> {
    let subnet = service.create_subnet(&project_id, &region, input).await?;
    Ok((StatusCode::CREATED, Json(subnet)))
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/regions/{region}/subnetworks/{subnetwork}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("region" = String, Path, description = "Region name"),
        ("subnetwork" = String, Path, description = "Subnetwork name")
    ),
    responses((status = 200, description = "Subnetwork found", body = Subnet), (status = 404, response = NotFoundResponse))
)]
async fn get_subnet<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, region, subnetwork)): Path<(String, String, String)>,
) -> NetworkResult<Json<Subnet>> {
    Ok(Json(service.get_subnet(&project_id, &region, &subnetwork).await?))
}

#[utoipa::path(
    delete,
    path = "/compute/v1/projects/{project_id}/regions/{region}/subnetworks/{subnetwork}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("region" = String, Path, description = "Region name"),
        ("subnetwork" = String, Path, description = "Subnetwork name")
    ),
    responses((status = 204, description = "Subnetwork deleted"), (status = 404, response = NotFoundResponse))
)]
async fn delete_subnet<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, region, subnetwork)): Path<(String, String, String)>,
) -> NetworkResult<impl IntoResponse> {
    service.delete_subnet(&project_id, &region, &subnetwork).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/global/routes",
    tag = "Networks",
    params(("project_id" = String, Path, description = "Project identifier")),
    responses((status = 200, description = "List of routes", body = Vec<Route>))
)]
async fn list_routes<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path(project_id): Path<String>,
) -> NetworkResult<Json<Vec<Route>>> {
    Ok(Json(service.list_routes(&project_id).await?))
}

#[utoipa::path(
    post,
    path = "/compute/v1/projects/{project_id}/global/routes",
    tag = "Networks",
    params(("project_id" = String, Path, description = "Project identifier")),
    request_body = CreateRoute,
    responses(
        (status = 201, description = "Route created", body = Route),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn create_route<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path(project_id): Path<String>,
    ValidatedJson(input): ValidatedJson<CreateRoute>,
) -> NetworkResult<impl IntoResponse> {
    let route = service.create_route(&project_id, input).await?;
    Ok((StatusCode::CREATED, Json(route)))
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/global/routes/{route}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("route" = String, Path, description = "Route name")
    ),
    responses((status = 200, description = "Route found", body = Route), (status = 404, response = NotFoundResponse))
)]
async fn get_route<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, route)): Path<(String, String)>,
) -> NetworkResult<Json<Route>> {
    Ok(Json(service.get_route(&project_id, &route).await?))
}

#[utoipa::path(
    patch,
    path = "/compute/v1/projects/{project_id}/global/routes/{route}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("route" = String, Path, description = "Route name")
    ),
    request_body = UpdateRoute,
    responses((status = 200, description = "Route updated", body = Route), (status = 404, response = NotFoundResponse))
)]
async fn update_route<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, route)): Path<(String, String)>,
    ValidatedJson(input): ValidatedJson<UpdateRoute>,
) -> NetworkResult<Json<Route>> {
    Ok(Json(service.update_route(&project_id, &route, input).await?))
}

#[utoipa::path(
    delete,
    path = "/compute/v1/projects/{project_id}/global/routes/{route}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("route" = String, Path, description = "Route name")
    ),
    responses((status = 204, description = "Route deleted"), (status = 404, response = NotFoundResponse))
)]
async fn delete_route<R: NetworkRepository>(
    State(service): State<Arc<NetworkService<R>>>,
    Path((project_id, route)): Path<(String, String)>,
) -> NetworkResult<impl IntoResponse> {
    service.delete_route(&project_id, &route).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The internet gateway is a constant pseudo-resource; listing returns a
/// single-element collection for client compatibility.
#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/global/internetGateways",
    tag = "Networks",
    params(("project_id" = String, Path, description = "Project identifier")),
    responses((status = 200, description = "The constant internet gateway", body = Vec<InternetGateway>))
)]
async fn list_internet_gateways<R: NetworkRepository>(
    State(_service): State<Arc<NetworkService<R>>>,
    Path(_project_id): Path<String>,
) -> Json<Vec<InternetGateway>> {
    Json(vec![InternetGateway::constant()])
}

#[utoipa::path(
    get,
    path = "/compute/v1/projects/{project_id}/global/internetGateways/{gateway}",
    tag = "Networks",
    params(
        ("project_id" = String, Path, description = "Project identifier"),
        ("gateway" = String, Path, description = "Always 'default-internet-gateway'")
    ),
    responses((status = 200, description = "The constant internet gateway", body = InternetGateway))
)]
async fn get_internet_gateway<R: NetworkRepository>(
    State(_service): State<Arc<NetworkService<R>>>,
    Path((_project_id, _gateway)): Path<(String, String)>,
) -> Json<InternetGateway> {
    Json(InternetGateway::constant())
}
