//! DAX: parameter groups

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::Result;

pub const ERR_PARAMETER_GROUP_NOT_FOUND: &str = "ParameterGroupNotFoundFault";
pub const ERR_PARAMETER_GROUP_ALREADY_EXISTS: &str = "ParameterGroupAlreadyExistsFault";
pub const ERR_INVALID_PARAMETER_VALUE: &str = "InvalidParameterValueException";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub parameter_group_name: String,
    /// The service stores `" "` when no description was given
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Parameter {
    pub parameter_name: String,
    pub parameter_value: String,
}

#[async_trait]
pub trait DaxApi: Send + Sync {
    async fn create_parameter_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ParameterGroup>;

    async fn describe_parameter_groups(&self, names: &[String]) -> Result<Vec<ParameterGroup>>;

    async fn describe_parameters(&self, name: &str) -> Result<Vec<Parameter>>;

    async fn update_parameter_group(
        &self,
        name: &str,
        parameters: &[Parameter],
    ) -> Result<ParameterGroup>;

    async fn delete_parameter_group(&self, name: &str) -> Result<()>;
}
