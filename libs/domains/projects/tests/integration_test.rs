//! Integration tests for the Projects domain against real PostgreSQL.
//!
//! Gated `#[ignore]` since they require a Docker-capable host for testcontainers,
//! following the convention in `libs/database`'s Cassandra/MongoDB connector tests.

use domain_projects::{CreateProject, PgProjectRepository, ProjectFilter, ProjectRepository};
use test_utils::TestDatabase;

#[tokio::test]
#[ignore] // Requires Docker for testcontainers-backed Postgres.
async fn create_and_get_project_round_trips() {
    let db = TestDatabase::new().await;
    let repo = PgProjectRepository::new(db.connection());

    let created = repo
        .create(CreateProject {
            project_id: "demo-project".to_string(),
            display_name: "Demo Project".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created.display_name, "Demo Project");
    assert!(created.project_number >= 100_000_000_000);

    let fetched = repo
        .get_by_project_id("demo-project")
        .await
        .unwrap()
        .expect("project should exist");
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
#[ignore]
async fn duplicate_project_id_is_rejected() {
    let db = TestDatabase::new().await;
    let repo = PgProjectRepository::new(db.connection());

    repo.create(CreateProject {
        project_id: "dup-project".to_string(),
        display_name: String::new(),
    })
    .await
    .unwrap();

    let result = repo
        .create(CreateProject {
            project_id: "dup-project".to_string(),
            display_name: String::new(),
        })
        .await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore]
async fn list_projects_paginates() {
    let db = TestDatabase::new().await;
    let repo = PgProjectRepository::new(db.connection());

    for i in 0..5 {
        repo.create(CreateProject {
            project_id: format!("list-project-{i}"),
            display_name: String::new(),
        })
        .await
        .unwrap();
    }

    let page = repo
        .list(ProjectFilter { limit: 2, offset: 0 })
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
#[ignore]
async fn delete_project_removes_row() {
    let db = TestDatabase::new().await;
    let repo = PgProjectRepository::new(db.connection());

    repo.create(CreateProject {
        project_id: "to-delete".to_string(),
        display_name: String::new(),
    })
    .await
    .unwrap();

    assert!(repo.delete("to-delete").await.unwrap());
    assert!(repo.get_by_project_id("to-delete").await.unwrap().is_none());
    assert!(!repo.delete("to-delete").await.unwrap());
}
