//! Handler tests for the Projects domain: HTTP routing, status codes, and
//! JSON (de)serialization through `domain_projects::handlers::router`.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_projects::{
    CreateProject, DefaultNetworkEnsurer, InMemoryProjectRepository, Project, ProjectService,
    handlers,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

struct NoopEnsurer;

#[async_trait]
impl DefaultNetworkEnsurer for NoopEnsurer {
    async fn ensure_default_network(&self, _project_id: &str) -> Result<(), String> {
        Ok(())
    }
}

fn app() -> axum::Router {
    let service =
        ProjectService::new(InMemoryProjectRepository::new(), Arc::new(NoopEnsurer));
    handlers::router(service)
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_project_handler_returns_201() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/cloudresourcemanager/v1/projects")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&serde_json::json!({
                "projectId": "demo-1",
                "displayName": "Demo"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let project: Project = json_body(response.into_body()).await;
    assert_eq!(project.project_id, "demo-1");
    assert_eq!(project.display_name, "Demo");
}

#[tokio::test]
async fn create_project_handler_rejects_invalid_project_id() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/cloudresourcemanager/v1/projects")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&serde_json::json!({ "projectId": "AB" })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_project_handler_rejects_duplicate_project_id() {
    let app = app();

    let body = || {
        Body::from(
            serde_json::to_string(&serde_json::json!({ "projectId": "dup-project" })).unwrap(),
        )
    };

    let first = Request::builder()
        .method("POST")
        .uri("/cloudresourcemanager/v1/projects")
        .header("content-type", "application/json")
        .body(body())
        .unwrap();
    assert_eq!(
        app.clone().oneshot(first).await.unwrap().status(),
        StatusCode::CREATED
    );

    let second = Request::builder()
        .method("POST")
        .uri("/cloudresourcemanager/v1/projects")
        .header("content-type", "application/json")
        .body(body())
        .unwrap();
    assert_eq!(app.oneshot(second).await.unwrap().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn get_project_handler_returns_200() {
    let app = app();

    let create = Request::builder()
        .method("POST")
        .uri("/cloudresourcemanager/v1/projects")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&serde_json::json!({ "projectId": "get-project" })).unwrap(),
        ))
        .unwrap();
    app.clone().oneshot(create).await.unwrap();

    let get = Request::builder()
        .method("GET")
        .uri("/cloudresourcemanager/v1/projects/get-project")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let project: Project = json_body(response.into_body()).await;
    assert_eq!(project.project_id, "get-project");
}

#[tokio::test]
async fn get_project_handler_returns_404_for_missing() {
    let app = app();

    let request = Request::builder()
        .method("GET")
        .uri("/cloudresourcemanager/v1/projects/missing-project")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_projects_handler_returns_created_projects() {
    let app = app();

    for id in ["list-a", "list-b"] {
        let request = Request::builder()
            .method("POST")
            .uri("/cloudresourcemanager/v1/projects")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({ "projectId": id })).unwrap(),
            ))
            .unwrap();
        app.clone().oneshot(request).await.unwrap();
    }

    let request = Request::builder()
        .method("GET")
        .uri("/cloudresourcemanager/v1/projects")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let projects: Vec<Project> = json_body(response.into_body()).await;
    assert_eq!(projects.len(), 2);
}

#[tokio::test]
async fn delete_project_handler_returns_204_then_404() {
    let app = app();

    let create = Request::builder()
        .method("POST")
        .uri("/cloudresourcemanager/v1/projects")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&serde_json::json!({ "projectId": "delete-project" })).unwrap(),
        ))
        .unwrap();
    app.clone().oneshot(create).await.unwrap();

    let delete = Request::builder()
        .method("DELETE")
        .uri("/cloudresourcemanager/v1/projects/delete-project")
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        app.clone().oneshot(delete).await.unwrap().status(),
        StatusCode::NO_CONTENT
    );

    let delete_again = Request::builder()
        .method("DELETE")
        .uri("/cloudresourcemanager/v1/projects/delete-project")
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        app.oneshot(delete_again).await.unwrap().status(),
        StatusCode::NOT_FOUND
    );
}
