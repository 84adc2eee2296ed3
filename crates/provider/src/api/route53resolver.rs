//! Route 53 Resolver: forwarding rules

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{Result, Tags};

pub const ERR_RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

pub const RULE_STATUS_COMPLETE: &str = "COMPLETE";
pub const RULE_STATUS_DELETING: &str = "DELETING";
/// Synthetic status reported once a rule no longer exists
pub const RULE_STATUS_DELETED: &str = "DELETED";

pub const RULE_TYPES: &[&str] = &["FORWARD", "SYSTEM", "RECURSIVE"];

pub const SHARE_STATUS_NOT_SHARED: &str = "NOT_SHARED";
pub const SHARE_STATUS_SHARED_WITH_ME: &str = "SHARED_WITH_ME";
pub const SHARE_STATUS_SHARED_BY_ME: &str = "SHARED_BY_ME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverRule {
    pub id: String,
    pub arn: String,
    pub domain_name: String,
    pub name: String,
    pub owner_id: String,
    pub resolver_endpoint_id: Option<String>,
    pub rule_type: String,
    pub share_status: String,
    pub status: String,
}

/// Filter on a rule attribute (`DOMAIN_NAME`, `NAME`, `RESOLVER_ENDPOINT_ID`,
/// `TYPE`)
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

#[async_trait]
pub trait Route53ResolverApi: Send + Sync {
    async fn get_resolver_rule(&self, id: &str) -> Result<ResolverRule>;

    async fn list_resolver_rules(&self, filters: &[Filter]) -> Result<Vec<ResolverRule>>;

    async fn list_tags_for_resource(&self, arn: &str) -> Result<Tags>;
}
