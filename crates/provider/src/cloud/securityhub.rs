use async_trait::async_trait;
use stratus_common::Result;

use super::{kind, SimulatedCloud};
use crate::api::securityhub::*;

#[async_trait]
impl SecurityHubApi for SimulatedCloud {
    async fn update_organization_configuration(&self, auto_enable: bool) -> Result<()> {
        self.enter("UpdateOrganizationConfiguration")?;
        let config = OrganizationConfiguration {
            auto_enable,
            member_account_limit_reached: false,
        };
        let id = self.account_id.as_str();
        if !self
            .db
            .update(kind::SECURITYHUB_ORG_CONFIG, id, &config)?
        {
            self.db
                .insert(kind::SECURITYHUB_ORG_CONFIG, id, id, &config, "", None)?;
        }
        Ok(())
    }

    async fn describe_organization_configuration(&self) -> Result<OrganizationConfiguration> {
        self.enter("DescribeOrganizationConfiguration")?;
        Ok(self
            .db
            .get::<OrganizationConfiguration>(kind::SECURITYHUB_ORG_CONFIG, &self.account_id)?
            .map(|row| row.body)
            .unwrap_or_default())
    }
}
