pub use sea_orm_migration::prelude::*;

mod m20241128_000000_bootstrap;
mod m20260110_000000_create_projects;
mod m20260110_000001_create_networks;
mod m20260110_000002_create_instances;
mod m20260110_000003_create_storage;
mod m20260110_000004_create_service_accounts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241128_000000_bootstrap::Migration),
            Box::new(m20260110_000000_create_projects::Migration),
            Box::new(m20260110_000001_create_networks::Migration),
            Box::new(m20260110_000002_create_instances::Migration),
            Box::new(m20260110_000003_create_storage::Migration),
            Box::new(m20260110_000004_create_service_accounts::Migration),
        ]
    }
}
