use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

static ACCOUNT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").unwrap());

fn validate_account_id(id: &str) -> Result<(), validator::ValidationError> {
    if !ACCOUNT_ID_PATTERN.is_match(id) {
        return Err(validator::ValidationError::new("invalid_account_id"));
    }
    Ok(())
}

/// A service account: metadata only, no key material is ever emulated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceAccount {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub email: String,
    pub project_id: String,
    pub display_name: String,
    pub description: String,
    pub unique_id: String,
    pub disabled: bool,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateServiceAccount {
    #[validate(custom(function = "validate_account_id"))]
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ServiceAccountFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for ServiceAccountFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ServiceAccount {
    pub fn new(project_id: &str, input: CreateServiceAccount) -> Self {
        let email = format!("{}@{}.iam.gserviceaccount.com", input.account_id, project_id);
        let display_name = if input.display_name.is_empty() {
            input.account_id.clone()
        } else {
            input.display_name
        };
        Self {
            id: Uuid::now_v7(),
            email,
            project_id: project_id.to_string(),
            display_name,
            description: input.description,
            unique_id: random_unique_id(),
            disabled: false,
            create_time: Utc::now(),
        }
    }
}

/// 21-digit decimal unique id, matching the cloud's service-account numbering.
fn random_unique_id() -> String {
    let mut rng = rand::rng();
    let mut digits = String::with_capacity(21);
    digits.push(char::from(b'1' + rng.random_range(0..9u8)));
    for _ in 0..20 {
        digits.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    digits
}
