use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Lower-case letters, digits and hyphens, 6-30 characters — the cloud's project id rule.
static PROJECT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").unwrap());

fn validate_project_id(id: &str) -> Result<(), validator::ValidationError> {
    if id.len() < 6 || id.len() > 30 || !PROJECT_ID_PATTERN.is_match(id) {
        return Err(validator::ValidationError::new("invalid_project_id"));
    }
    Ok(())
}

/// A cloud project: the top-level container that owns networks, instances, buckets and
/// service accounts. `project_id` is the client-chosen identifier (e.g. `demo-1`); `id`
/// is an internal surrogate key used only for foreign keys.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub project_id: String,
    pub display_name: String,
    pub project_number: i64,
    pub create_time: DateTime<Utc>,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProject {
    #[validate(custom(function = "validate_project_id"))]
    pub project_id: String,
    #[serde(default)]
    pub display_name: String,
}

/// Query filters for listing projects.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ProjectFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Project {
    pub fn new(input: CreateProject) -> Self {
        let display_name = if input.display_name.is_empty() {
            input.project_id.clone()
        } else {
            input.display_name
        };
        Self {
            id: Uuid::now_v7(),
            project_id: input.project_id,
            display_name,
            project_number: random_project_number(),
            create_time: Utc::now(),
        }
    }
}

/// Google Cloud project numbers are 10-12 digit decimals; this generates one in that range.
fn random_project_number() -> i64 {
    rand::rng().random_range(100_000_000_000..999_999_999_999)
}
