//! GameLift: fleet aliases

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{Result, Tags};

pub const ERR_NOT_FOUND: &str = "NotFoundException";
pub const ERR_INVALID_REQUEST: &str = "InvalidRequestException";

pub const ROUTING_STRATEGY_SIMPLE: &str = "SIMPLE";
pub const ROUTING_STRATEGY_TERMINAL: &str = "TERMINAL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingStrategy {
    #[serde(rename = "type")]
    pub strategy_type: String,
    pub fleet_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub alias_id: String,
    pub alias_arn: String,
    pub name: String,
    pub description: Option<String>,
    pub routing_strategy: Option<RoutingStrategy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateAliasInput {
    pub name: String,
    pub description: Option<String>,
    pub routing_strategy: Option<RoutingStrategy>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAliasInput {
    pub alias_id: String,
    pub name: String,
    pub description: Option<String>,
    pub routing_strategy: Option<RoutingStrategy>,
}

#[async_trait]
pub trait GameLiftApi: Send + Sync {
    async fn create_alias(&self, input: &CreateAliasInput) -> Result<Alias>;

    async fn describe_alias(&self, alias_id: &str) -> Result<Alias>;

    async fn update_alias(&self, input: &UpdateAliasInput) -> Result<Alias>;

    async fn delete_alias(&self, alias_id: &str) -> Result<()>;

    async fn list_tags_for_resource(&self, arn: &str) -> Result<Tags>;

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()>;

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> Result<()>;
}
