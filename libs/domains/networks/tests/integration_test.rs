//! Integration tests for the Networks domain against real PostgreSQL.
//!
//! Gated `#[ignore]` since they require a Docker-capable host for testcontainers,
//! following the convention in `libs/database`'s Cassandra/MongoDB connector tests.

use domain_networks::{Cidr, CreateSubnet, Network, NetworkFilter, NetworkRepository, PgNetworkRepository, Subnet};
use test_utils::TestDatabase;

#[tokio::test]
#[ignore] // Requires Docker for testcontainers-backed Postgres.
async fn create_and_get_network_round_trips() {
    let db = TestDatabase::new().await;
    let repo = PgNetworkRepository::new(db.connection());

    let network = Network::new_default("demo-project", "bridge");
    repo.create_network(network.clone()).await.unwrap();

    let fetched = repo
        .get_network("demo-project", "default")
        .await
        .unwrap()
        .expect("network should exist");
    assert_eq!(fetched.cidr, "10.128.0.0/9");
}

#[tokio::test]
#[ignore]
async fn duplicate_network_name_is_rejected() {
    let db = TestDatabase::new().await;
    let repo = PgNetworkRepository::new(db.connection());

    repo.create_network(Network::new_default("demo-project", "bridge"))
        .await
        .unwrap();

    let result = repo
        .create_network(Network::new_default("demo-project", "bridge"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore]
async fn list_networks_is_scoped_per_project() {
    let db = TestDatabase::new().await;
    let repo = PgNetworkRepository::new(db.connection());

    repo.create_network(Network::new_default("project-a", "bridge"))
        .await
        .unwrap();
    repo.create_network(Network::new_default("project-b", "bridge"))
        .await
        .unwrap();

    let results = repo
        .list_networks("project-a", NetworkFilter::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].project_id, "project-a");
}

#[tokio::test]
#[ignore]
async fn allocate_ip_serializes_under_row_lock() {
    let db = TestDatabase::new().await;
    let repo = PgNetworkRepository::new(db.connection());

    repo.create_network(Network::new_default("demo-project", "bridge"))
        .await
        .unwrap();

    let cidr = Cidr::parse("10.128.0.0/29").unwrap();
    let input = CreateSubnet {
        name: "sn-a".to_string(),
        network: "default".to_string(),
        ip_cidr_range: "10.128.0.0/29".to_string(),
    };
    let subnet = Subnet::new("demo-project", "us-central1", &input, &cidr);
    let subnet = repo.create_subnet(subnet).await.unwrap();

    let mut handles = vec![];
    for _ in 0..5 {
        let repo = PgNetworkRepository::new(db.connection());
        let subnet_id = subnet.id;
        handles.push(tokio::spawn(async move { repo.allocate_ip(subnet_id).await }));
    }

    let mut offsets: Vec<i64> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();
    offsets.sort();
    assert_eq!(offsets, vec![2, 3, 4, 5, 6]);
}
