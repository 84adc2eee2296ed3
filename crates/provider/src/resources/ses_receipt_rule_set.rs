//! SES Receipt Rule Set resource

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{read_back, resource_id, Resource};
use crate::api::ses::ERR_RULE_SET_DOES_NOT_EXIST;
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema, Validator};
use crate::state::{get_string_attr, make_state, string_value, DynamicValue};

pub const TYPE_NAME: &str = "aws_ses_receipt_rule_set";

pub struct SesReceiptRuleSetResource;

#[async_trait::async_trait]
impl Resource for SesReceiptRuleSetResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .attribute(Attribute::computed("arn", AttributeType::String))
            .attribute(
                Attribute::required("rule_set_name", AttributeType::String)
                    .force_new()
                    .validate(Validator::StringLenBetween(1, 64)),
            )
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let name = get_string_attr(config, "rule_set_name");

        client
            .ses
            .create_receipt_rule_set(&name)
            .await
            .with_context(|| format!("error creating SES Receipt Rule Set ({})", name))?;
        info!("Created SES Receipt Rule Set {}", name);

        read_back(self, client, &name).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;

        let metadata = match client.ses.describe_receipt_rule_set(&id).await {
            Ok(metadata) => metadata,
            Err(err) if err.has_code(ERR_RULE_SET_DOES_NOT_EXIST) => {
                warn!("SES Receipt Rule Set ({}) not found, removing from state", id);
                return Ok(None);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("error reading SES Receipt Rule Set ({})", id))
            }
        };

        let arn = client.arn(
            "ses",
            &client.account_id,
            format!("receipt-rule-set/{}", metadata.name),
        );
        Ok(Some(make_state(vec![
            ("id", string_value(&metadata.name)),
            ("arn", string_value(arn.to_string())),
            ("rule_set_name", string_value(&metadata.name)),
        ])))
    }

    async fn update(
        &self,
        client: &CloudClient,
        prior: &DynamicValue,
        _planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        // Every configurable attribute forces replacement
        read_back(self, client, &resource_id(prior)?).await
    }

    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()> {
        let id = resource_id(state)?;

        info!("Deleting SES Receipt Rule Set ({})", id);
        client
            .ses
            .delete_receipt_rule_set(&id)
            .await
            .with_context(|| format!("error deleting SES Receipt Rule Set ({})", id))
    }
}
