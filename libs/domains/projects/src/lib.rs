//! Project domain
//!
//! Implements the `cloudresourcemanager.googleapis.com/v1/projects` resource: the
//! top-level container every other resource family (networks, instances, buckets,
//! service accounts) is scoped under.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, validation, default-network orchestration
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ProjectError, ProjectResult};
pub use handlers::ApiDoc;
pub use models::{CreateProject, Project, ProjectFilter};
pub use postgres::PgProjectRepository;
pub use repository::{InMemoryProjectRepository, ProjectRepository};
pub use service::{DefaultNetworkEnsurer, ProjectResourceCleaner, ProjectService};

pub use core_proc_macros::ApiResource;
