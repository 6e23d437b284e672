//! OpenAPI documentation configuration.
//!
//! Each domain's `ApiDoc` already carries the absolute GCP-style paths its
//! handlers are mounted at (`/compute/v1/projects/{project}/...`,
//! `/storage/v1/b/...`, ...), so every nested path here uses an empty prefix
//! rather than re-anchoring them under this crate.

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the emulator.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cloud Platform Emulator",
        version = "0.1.0",
        description = "Local emulator for a subset of storage, compute, networking and identity REST APIs",
        license(name = "MIT")
    ),
    nest(
        (path = "", api = domain_projects::ApiDoc),
        (path = "", api = domain_networks::ApiDoc),
        (path = "", api = domain_compute::ApiDoc),
        (path = "", api = domain_storage::ApiDoc),
        (path = "", api = domain_identity::ApiDoc),
    )
)]
pub struct ApiDoc;
