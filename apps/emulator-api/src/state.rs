//! Concrete type aliases for the services wired together in `main`.
//!
//! Every domain service is generic over its repository trait so it can run
//! against an in-memory repository in tests; the running binary fixes these
//! to the Postgres-backed implementations.

use std::sync::Arc;

use domain_compute::{InstanceService, PgInstanceRepository};
use domain_identity::{IdentityService, PgServiceAccountRepository};
use domain_networks::{NetworkService, PgNetworkRepository};
use domain_projects::{PgProjectRepository, ProjectService};
use domain_storage::{PgStorageRepository, StorageService};
use sea_orm::DatabaseConnection;

pub type Networks = NetworkService<PgNetworkRepository>;
pub type Instances = InstanceService<PgInstanceRepository, PgNetworkRepository>;
pub type Projects = ProjectService<PgProjectRepository>;
pub type Storage = StorageService<PgStorageRepository>;
pub type Identity = IdentityService<PgServiceAccountRepository>;

/// Every running domain service, held so the background sweepers and the
/// `/ready` handler can reach them after the HTTP routers have taken their
/// own `Arc` clones.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<Projects>,
    pub networks: Arc<Networks>,
    pub instances: Arc<Instances>,
    pub storage: Arc<Storage>,
    pub identity: Arc<Identity>,
    pub db: DatabaseConnection,
}
