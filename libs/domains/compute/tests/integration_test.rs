//! Integration tests for the Compute domain against real PostgreSQL.
//!
//! Gated `#[ignore]` since they require a Docker-capable host for testcontainers,
//! following the convention in `libs/database`'s Cassandra/MongoDB connector tests.

use domain_compute::{Instance, InstanceFilter, InstanceRepository, PgInstanceRepository};
use test_utils::TestDatabase;

fn sample(project_id: &str, name: &str) -> Instance {
    Instance::new(project_id, "us-central1-a", name, "e2-medium", "default", None, "vm-container")
}

#[tokio::test]
#[ignore] // Requires Docker for testcontainers-backed Postgres.
async fn create_and_get_instance_round_trips() {
    let db = TestDatabase::new().await;
    let repo = PgInstanceRepository::new(db.connection());

    repo.create_instance(sample("demo-project", "vm1")).await.unwrap();

    let fetched = repo
        .get_instance("demo-project", "us-central1-a", "vm1")
        .await
        .unwrap()
        .expect("instance should exist");
    assert_eq!(fetched.machine_type, "e2-medium");
}

#[tokio::test]
#[ignore]
async fn duplicate_instance_name_is_rejected() {
    let db = TestDatabase::new().await;
    let repo = PgInstanceRepository::new(db.connection());

    repo.create_instance(sample("demo-project", "vm1")).await.unwrap();
    let result = repo.create_instance(sample("demo-project", "vm1")).await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore]
async fn list_instances_is_scoped_per_project_and_zone() {
    let db = TestDatabase::new().await;
    let repo = PgInstanceRepository::new(db.connection());

    repo.create_instance(sample("project-a", "vm1")).await.unwrap();
    repo.create_instance(sample("project-b", "vm2")).await.unwrap();

    let results = repo
        .list_instances("project-a", "us-central1-a", InstanceFilter::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].project_id, "project-a");
}

#[tokio::test]
#[ignore]
async fn delete_instance_removes_row() {
    let db = TestDatabase::new().await;
    let repo = PgInstanceRepository::new(db.connection());

    repo.create_instance(sample("demo-project", "vm1")).await.unwrap();
    assert!(repo.delete_instance("demo-project", "us-central1-a", "vm1").await.unwrap());
    assert!(repo
        .get_instance("demo-project", "us-central1-a", "vm1")
        .await
        .unwrap()
        .is_none());
}
