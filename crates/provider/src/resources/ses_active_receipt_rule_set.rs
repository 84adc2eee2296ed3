//! SES Active Receipt Rule Set resource
//!
//! Selects which receipt rule set the account uses. There is exactly one
//! active set per account and region, so create and update are the same
//! call and delete simply deactivates.

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{read_back, resource_id, Resource};
use crate::api::ses::ERR_RULE_SET_DOES_NOT_EXIST;
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema, Validator};
use crate::state::{get_string_attr, make_state, string_value, DynamicValue};

pub const TYPE_NAME: &str = "aws_ses_active_receipt_rule_set";

pub struct SesActiveReceiptRuleSetResource;

impl SesActiveReceiptRuleSetResource {
    async fn activate(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let name = get_string_attr(config, "rule_set_name");

        client
            .ses
            .set_active_receipt_rule_set(Some(&name))
            .await
            .context("error setting active SES rule set")?;
        info!("Activated SES Receipt Rule Set {}", name);

        read_back(self, client, &name).await
    }
}

#[async_trait::async_trait]
impl Resource for SesActiveReceiptRuleSetResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .attribute(Attribute::computed("arn", AttributeType::String))
            .attribute(
                Attribute::required("rule_set_name", AttributeType::String)
                    .validate(Validator::StringLenBetween(1, 64)),
            )
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        self.activate(client, config).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;

        let active = match client.ses.describe_active_receipt_rule_set().await {
            Ok(active) => active,
            Err(err) if err.has_code(ERR_RULE_SET_DOES_NOT_EXIST) => {
                warn!(
                    "SES Receipt Rule Set ({}) belonging to SES Active Receipt Rule Set not found, removing from state",
                    id
                );
                return Ok(None);
            }
            Err(err) => return Err(err).context("error reading active SES rule set"),
        };

        let Some(metadata) = active else {
            warn!("No active SES Receipt Rule Set found, removing from state");
            return Ok(None);
        };

        let arn = client.arn(
            "ses",
            &client.account_id,
            format!("receipt-rule-set/{}", id),
        );
        Ok(Some(make_state(vec![
            ("id", string_value(&id)),
            ("arn", string_value(arn.to_string())),
            ("rule_set_name", string_value(&metadata.name)),
        ])))
    }

    async fn update(
        &self,
        client: &CloudClient,
        _prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        self.activate(client, planned).await
    }

    async fn delete(&self, client: &CloudClient, _state: &DynamicValue) -> Result<()> {
        info!("Deactivating active SES Receipt Rule Set");
        client
            .ses
            .set_active_receipt_rule_set(None)
            .await
            .context("error deleting active SES rule set")
    }

    fn importable(&self) -> bool {
        false
    }
}
