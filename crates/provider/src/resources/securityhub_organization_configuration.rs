//! Security Hub Organization Configuration resource
//!
//! A per-account singleton: the id is the caller's account id and deleting
//! only forgets the resource.

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{read_back, Resource};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema};
use crate::state::{bool_value, get_bool_attr, get_string_attr, make_state, string_value, DynamicValue};

pub const TYPE_NAME: &str = "aws_securityhub_organization_configuration";

pub struct SecurityHubOrganizationConfigurationResource;

impl SecurityHubOrganizationConfigurationResource {
    async fn put(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let auto_enable = get_bool_attr(config, "auto_enable", false);

        info!(
            "Updating Security Hub Organization Configuration (auto_enable: {})",
            auto_enable
        );
        client
            .securityhub
            .update_organization_configuration(auto_enable)
            .await
            .with_context(|| {
                format!(
                    "error updating Security Hub Organization Configuration ({})",
                    client.account_id
                )
            })?;

        read_back(self, client, &client.account_id).await
    }
}

#[async_trait::async_trait]
impl Resource for SecurityHubOrganizationConfigurationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .attribute(Attribute::required("auto_enable", AttributeType::Bool))
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        self.put(client, config).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let output = client
            .securityhub
            .describe_organization_configuration()
            .await
            .context("error reading Security Hub Organization Configuration")?;

        let id = match get_string_attr(state, "id") {
            id if id.is_empty() => client.account_id.clone(),
            id => id,
        };
        Ok(Some(make_state(vec![
            ("id", string_value(id)),
            ("auto_enable", bool_value(output.auto_enable)),
        ])))
    }

    async fn update(
        &self,
        client: &CloudClient,
        _prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        self.put(client, planned).await
    }

    async fn delete(&self, _client: &CloudClient, _state: &DynamicValue) -> Result<()> {
        debug!("Security Hub Organization Configuration has no delete; forgetting it");
        Ok(())
    }
}
