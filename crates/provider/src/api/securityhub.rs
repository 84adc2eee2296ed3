//! Security Hub: organization configuration

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::Result;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationConfiguration {
    pub auto_enable: bool,
    pub member_account_limit_reached: bool,
}

#[async_trait]
pub trait SecurityHubApi: Send + Sync {
    async fn update_organization_configuration(&self, auto_enable: bool) -> Result<()>;

    async fn describe_organization_configuration(&self) -> Result<OrganizationConfiguration>;
}
