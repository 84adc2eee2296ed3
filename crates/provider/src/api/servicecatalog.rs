//! Service Catalog: portfolio/product constraints

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::Result;

pub const ERR_RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
pub const ERR_INVALID_PARAMETERS: &str = "InvalidParametersException";
pub const ERR_DUPLICATE_RESOURCE: &str = "DuplicateResourceException";

pub const ACCEPT_LANGUAGE_ENGLISH: &str = "en";
pub const ACCEPT_LANGUAGES: &[&str] = &["en", "jp", "zh"];

pub const CONSTRAINT_TYPES: &[&str] = &[
    "LAUNCH",
    "NOTIFICATION",
    "RESOURCE_UPDATE",
    "STACKSET",
    "TEMPLATE",
];

pub mod status {
    pub const AVAILABLE: &str = "AVAILABLE";
    pub const CREATING: &str = "CREATING";
    pub const FAILED: &str = "FAILED";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDetail {
    pub constraint_id: String,
    #[serde(rename = "type")]
    pub constraint_type: String,
    pub description: String,
    pub owner: String,
    pub portfolio_id: String,
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeConstraintOutput {
    pub constraint_detail: ConstraintDetail,
    pub constraint_parameters: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateConstraintInput {
    pub accept_language: Option<String>,
    pub description: Option<String>,
    /// Repeated requests with the same token return the original constraint
    pub idempotency_token: String,
    pub parameters: String,
    pub portfolio_id: String,
    pub product_id: String,
    pub constraint_type: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateConstraintInput {
    pub id: String,
    pub accept_language: Option<String>,
    pub description: Option<String>,
    pub parameters: Option<String>,
}

#[async_trait]
pub trait ServiceCatalogApi: Send + Sync {
    async fn create_constraint(&self, input: &CreateConstraintInput)
        -> Result<DescribeConstraintOutput>;

    async fn describe_constraint(
        &self,
        accept_language: &str,
        id: &str,
    ) -> Result<DescribeConstraintOutput>;

    async fn update_constraint(&self, input: &UpdateConstraintInput)
        -> Result<DescribeConstraintOutput>;

    async fn delete_constraint(&self, accept_language: &str, id: &str) -> Result<()>;
}
