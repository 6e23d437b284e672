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

use crate::error::ProjectResult;
use crate::models::{CreateProject, Project, ProjectFilter};
use crate::repository::ProjectRepository;
use crate::service::ProjectService;

/// OpenAPI documentation for the Project Service
#[derive(OpenApi)]
#[openapi(
    paths(list_projects, create_project, get_project, delete_project),
    components(
        schemas(Project, CreateProject, ProjectFilter),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Projects", description = "Project lifecycle: cloudresourcemanager.googleapis.com/v1/projects")
    )
)]
pub struct ApiDoc;

/// Create the project router with all HTTP endpoints
pub fn router<R: ProjectRepository + 'static>(service: ProjectService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/cloudresourcemanager/v1/projects",
            get(list_projects).post(create_project),
        )
        .route(
            "/cloudresourcemanager/v1/projects/{project_id}",
            get(get_project).delete(delete_project),
        )
        .with_state(shared_service)
}

/// List projects
#[utoipa::path(
    get,
    path = "/cloudresourcemanager/v1/projects",
    tag = "Projects",
    params(ProjectFilter),
    responses(
        (status = 200, description = "List of projects", body = Vec<Project>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_projects<R: ProjectRepository>(
    State(service): State<Arc<ProjectService<R>>>,
    Query(filter): Query<ProjectFilter>,
) -> ProjectResult<Json<Vec<Project>>> {
    let projects = service.list_projects(filter).await?;
    Ok(Json(projects))
}

/// Create a new project
#[utoipa::path(
    post,
    path = "/cloudresourcemanager/v1/projects",
    tag = "Projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created successfully", body = Project),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_project<R: ProjectRepository>(
    State(service): State<Arc<ProjectService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProject>,
) -> ProjectResult<impl IntoResponse> {
    let project = service.create_project(input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project by its project_id
#[utoipa::path(
    get,
    path = "/cloudresourcemanager/v1/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = String, Path, description = "Project identifier")
    ),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_project<R: ProjectRepository>(
    State(service): State<Arc<ProjectService<R>>>,
    Path(project_id): Path<String>,
) -> ProjectResult<Json<Project>> {
    let project = service.get_project(&project_id).await?;
    Ok(Json(project))
}

/// Delete a project by its project_id
#[utoipa::path(
    delete,
    path = "/cloudresourcemanager/v1/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = String, Path, description = "Project identifier")
    ),
    responses(
        (status = 204, description = "Project deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_project<R: ProjectRepository>(
    State(service): State<Arc<ProjectService<R>>>,
    Path(project_id): Path<String>,
) -> ProjectResult<impl IntoResponse> {
    service.delete_project(&project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
