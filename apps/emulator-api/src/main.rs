use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum_helpers::security_headers;
use axum_helpers::server::{create_production_app, health_router};
use container::BollardContainerDriver;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_compute::{InstanceService, PgInstanceRepository};
use domain_identity::{IdentityService, PgServiceAccountRepository};
use domain_networks::{NetworkService, PgNetworkRepository};
use domain_projects::{PgProjectRepository, ProjectFilter, ProjectService};
use domain_storage::{ByteStore, PgStorageRepository, StorageService};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod composition;
mod config;
mod health;
mod middleware;
mod openapi;
mod state;

use composition::{InstanceLookup, NetworkEnsurer, ResourceCleaner};
use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics();

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<migration::Migrator>(&db, "emulator-api")
        .await
        .map_err(|e| eyre::eyre!("migrations failed: {}", e))?;

    let driver = Arc::new(
        BollardContainerDriver::connect(config.emulator.docker_host.as_deref())
            .map_err(|e| eyre::eyre!("failed to connect to container engine: {}", e))?,
    ) as Arc<dyn container::ContainerDriver>;

    let vendor_prefix = config.emulator.vendor_prefix.clone();

    let network_repo = PgNetworkRepository::new(db.clone());
    let networks_internal = Arc::new(NetworkService::new(
        network_repo.clone(),
        driver.clone(),
        vendor_prefix.clone(),
    ));

    let instance_repo = PgInstanceRepository::new(db.clone());
    let instances = Arc::new(InstanceService::new(
        instance_repo,
        networks_internal.clone(),
        driver.clone(),
        vendor_prefix.clone(),
        config.emulator.instance_image.clone(),
    ));

    let instance_checker =
        Arc::new(InstanceLookup { instances: instances.clone() }) as Arc<dyn domain_networks::InstanceAttachmentChecker>;

    let networks = Arc::new(
        NetworkService::new(network_repo, driver.clone(), vendor_prefix.clone())
            .with_instance_checker(instance_checker),
    );

    let storage_repo = PgStorageRepository::new(db.clone());
    let byte_store = Arc::new(ByteStore::new(config.emulator.object_store_base_dir.clone()));
    let storage = Arc::new(StorageService::new(
        storage_repo,
        byte_store,
        config.emulator.signed_url_base.clone(),
    ));

    let identity_repo = PgServiceAccountRepository::new(db.clone());
    let identity = Arc::new(IdentityService::new(identity_repo));

    let network_ensurer =
        Arc::new(NetworkEnsurer { networks: networks.clone() }) as Arc<dyn domain_projects::DefaultNetworkEnsurer>;

    let resource_cleaner = Arc::new(ResourceCleaner {
        instances: instances.clone(),
        networks: networks.clone(),
        storage: storage.clone(),
        identity: identity.clone(),
    }) as Arc<dyn domain_projects::ProjectResourceCleaner>;

    let project_repo = PgProjectRepository::new(db.clone());
    let projects = Arc::new(
        ProjectService::new(project_repo, network_ensurer).with_resource_cleaner(resource_cleaner),
    );

    // Existing projects created before this boot still need a default network;
    // new ones get one synchronously via `network_ensurer` at create time.
    reconcile_default_networks(&projects, &networks).await;

    let state = AppState {
        projects: projects.clone(),
        networks: networks.clone(),
        instances: instances.clone(),
        storage: storage.clone(),
        identity: identity.clone(),
        db: db.clone(),
    };

    let api_routes = Router::new()
        .merge(domain_projects::handlers::router((*projects).clone()))
        .merge(domain_networks::handlers::router((*networks).clone()))
        .merge(domain_compute::handlers::router((*instances).clone()))
        .merge(domain_storage::handlers::router((*storage).clone()))
        .merge(domain_identity::handlers::router((*identity).clone()))
        .layer(DefaultBodyLimit::max(config.emulator.max_upload_bytes as usize));

    let metrics_router = Router::new().route("/metrics", axum::routing::get(observability::metrics_handler));
    let ready_router = Router::new()
        .route("/ready", axum::routing::get(health::ready_handler))
        .with_state(state);

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .merge(api_routes)
        .merge(health_router(config.app.clone()))
        .merge(ready_router)
        .merge(metrics_router)
        .fallback(not_found)
        .layer(axum::middleware::from_fn(observability::middleware::metrics_middleware))
        .layer(axum::middleware::from_fn(middleware::audit_mutations))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(axum::middleware::from_fn(security_headers))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.emulator.request_deadline_secs)));

    spawn_sweepers(storage.clone(), config.emulator.sweep_interval_secs);

    info!("Starting emulator API");

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Emulator API shutdown complete");
    Ok(())
}

async fn reconcile_default_networks(
    projects: &ProjectService<PgProjectRepository>,
    networks: &NetworkService<PgNetworkRepository>,
) {
    let existing = match projects
        .list_projects(ProjectFilter { limit: 10_000, offset: 0 })
        .await
    {
        Ok(projects) => projects,
        Err(e) => {
            warn!("could not list projects for default-network reconciliation: {}", e);
            return;
        }
    };

    for project in existing {
        if let Err(e) = networks.ensure_default_network(&project.project_id).await {
            warn!(
                project_id = %project.project_id,
                error = %e,
                "failed to reconcile default network"
            );
        }
    }
}

fn spawn_sweepers(storage: Arc<StorageService<PgStorageRepository>>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            match storage.sweep_expired_sessions().await {
                Ok(count) if count > 0 => info!(count, "swept expired signed-url sessions"),
                Ok(_) => {}
                Err(e) => warn!("signed-url sweep failed: {}", e),
            }
            match storage.sweep_orphans().await {
                Ok(count) if count > 0 => info!(count, "swept orphaned object bytes"),
                Ok(_) => {}
                Err(e) => warn!("orphan sweep failed: {}", e),
            }
        }
    });
}

async fn not_found() -> impl axum::response::IntoResponse {
    emulator_errors::ApiError::new(
        emulator_errors::ErrorKind::NotFound,
        "the requested resource was not found",
    )
}
