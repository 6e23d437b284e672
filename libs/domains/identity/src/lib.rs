//! Identity domain
//!
//! Implements `iam.googleapis.com/v1/projects/{p}/serviceAccounts`: metadata-only
//! service accounts. No real authentication or key material is emulated.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{IdentityError, IdentityResult};
pub use handlers::ApiDoc;
pub use models::{CreateServiceAccount, ServiceAccount, ServiceAccountFilter};
pub use postgres::PgServiceAccountRepository;
pub use repository::{InMemoryServiceAccountRepository, ServiceAccountRepository};
pub use service::IdentityService;

pub use core_proc_macros::ApiResource;
