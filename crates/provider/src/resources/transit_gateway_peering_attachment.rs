//! EC2 Transit Gateway Peering Attachment resource

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{read_back, resource_id, tag_changes, Resource};
use crate::api::ec2::{
    attachment_state, CreateTransitGatewayPeeringAttachmentInput, Ec2Api,
    TransitGatewayPeeringAttachment, ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND,
    ERR_TRANSIT_GATEWAY_NOT_FOUND,
};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema, Validator};
use crate::state::{
    get_optional_string_attr, get_string_attr, get_string_map_attr, make_state, string_map_value,
    string_value, DynamicValue,
};
use crate::waiter::StateChangeConf;

pub const TYPE_NAME: &str = "aws_ec2_transit_gateway_peering_attachment";

pub struct TransitGatewayPeeringAttachmentResource;

#[async_trait::async_trait]
impl Resource for TransitGatewayPeeringAttachmentResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .attribute(
                Attribute::optional_computed("peer_account_id", AttributeType::String)
                    .force_new()
                    .validate(Validator::AccountId)
                    .with_description("Account owning the peer transit gateway; defaults to the caller"),
            )
            .attribute(Attribute::required("peer_region", AttributeType::String).force_new())
            .attribute(
                Attribute::required("peer_transit_gateway_id", AttributeType::String).force_new(),
            )
            .attribute(Attribute::tags())
            .attribute(Attribute::required("transit_gateway_id", AttributeType::String).force_new())
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let input = CreateTransitGatewayPeeringAttachmentInput {
            transit_gateway_id: get_string_attr(config, "transit_gateway_id"),
            peer_transit_gateway_id: get_string_attr(config, "peer_transit_gateway_id"),
            peer_account_id: get_optional_string_attr(config, "peer_account_id")
                .unwrap_or_else(|| client.account_id.clone()),
            peer_region: get_string_attr(config, "peer_region"),
            tags: get_string_map_attr(config, "tags"),
        };

        debug!("Creating EC2 Transit Gateway Peering Attachment: {:?}", input);
        // A transit gateway created moments ago may not be visible yet
        let api = client.ec2.as_ref();
        let input = &input;
        let attachment = client
            .retry
            .run(
                move || api.create_transit_gateway_peering_attachment(input),
                |err| err.has_code(ERR_TRANSIT_GATEWAY_NOT_FOUND),
            )
            .await
            .context("error creating EC2 Transit Gateway Peering Attachment")?;
        let id = attachment.transit_gateway_attachment_id;
        info!("Created EC2 Transit Gateway Peering Attachment {}", id);

        wait_peering_attachment_created(client, &id)
            .await
            .with_context(|| {
                format!(
                    "error waiting for EC2 Transit Gateway Peering Attachment ({}) availability",
                    id
                )
            })?;

        read_back(self, client, &id).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;
        let attachment = find_peering_attachment(client.ec2.as_ref(), &id)
            .await
            .context("error reading EC2 Transit Gateway Peering Attachment")?;

        let Some(attachment) = attachment else {
            warn!(
                "EC2 Transit Gateway Peering Attachment ({}) not found, removing from state",
                id
            );
            return Ok(None);
        };

        if attachment.state == attachment_state::DELETING
            || attachment.state == attachment_state::DELETED
        {
            warn!(
                "EC2 Transit Gateway Peering Attachment ({}) in deleted state ({}), removing from state",
                id, attachment.state
            );
            return Ok(None);
        }

        Ok(Some(make_state(vec![
            ("id", string_value(&attachment.transit_gateway_attachment_id)),
            ("peer_account_id", string_value(&attachment.accepter_tgw_info.owner_id)),
            ("peer_region", string_value(&attachment.accepter_tgw_info.region)),
            (
                "peer_transit_gateway_id",
                string_value(&attachment.accepter_tgw_info.transit_gateway_id),
            ),
            (
                "transit_gateway_id",
                string_value(&attachment.requester_tgw_info.transit_gateway_id),
            ),
            ("tags", string_map_value(&attachment.tags)),
        ])))
    }

    async fn update(
        &self,
        client: &CloudClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = resource_id(prior)?;
        let (upserts, removals) = tag_changes(
            &get_string_map_attr(prior, "tags"),
            &get_string_map_attr(planned, "tags"),
        );

        let context = || {
            format!(
                "error updating EC2 Transit Gateway Peering Attachment ({}) tags",
                id
            )
        };
        if !removals.is_empty() {
            client
                .ec2
                .delete_tags(&id, &removals)
                .await
                .with_context(context)?;
        }
        if !upserts.is_empty() {
            client
                .ec2
                .create_tags(&id, &upserts)
                .await
                .with_context(context)?;
        }

        read_back(self, client, &id).await
    }

    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()> {
        let id = resource_id(state)?;

        debug!("Deleting EC2 Transit Gateway Peering Attachment ({})", id);
        if let Err(err) = client.ec2.delete_transit_gateway_peering_attachment(&id).await {
            if err.has_code(ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND) {
                return Ok(());
            }
            return Err(err).context("error deleting EC2 Transit Gateway Peering Attachment");
        }

        wait_peering_attachment_deleted(client, &id)
            .await
            .with_context(|| {
                format!(
                    "error waiting for EC2 Transit Gateway Peering Attachment ({}) deletion",
                    id
                )
            })?;
        Ok(())
    }
}

async fn find_peering_attachment(
    api: &dyn Ec2Api,
    id: &str,
) -> stratus_common::Result<Option<TransitGatewayPeeringAttachment>> {
    match api
        .describe_transit_gateway_peering_attachments(&[id.to_string()])
        .await
    {
        Ok(found) => Ok(found
            .into_iter()
            .find(|a| a.transit_gateway_attachment_id == id)),
        Err(err) if err.has_code(ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn status_peering_attachment(
    api: &dyn Ec2Api,
    id: &str,
) -> stratus_common::Result<Option<(TransitGatewayPeeringAttachment, String)>> {
    Ok(find_peering_attachment(api, id).await?.map(|a| {
        let state = a.state.clone();
        (a, state)
    }))
}

/// Attachments in the deleted state count as absent
async fn status_peering_attachment_deleting(
    api: &dyn Ec2Api,
    id: &str,
) -> stratus_common::Result<Option<(TransitGatewayPeeringAttachment, String)>> {
    Ok(status_peering_attachment(api, id)
        .await?
        .filter(|(_, state)| state != attachment_state::DELETED))
}

async fn wait_peering_attachment_created(
    client: &CloudClient,
    id: &str,
) -> stratus_common::Result<Option<TransitGatewayPeeringAttachment>> {
    let api = client.ec2.as_ref();
    StateChangeConf::new(
        &[attachment_state::INITIATING_REQUEST, attachment_state::PENDING],
        &[attachment_state::AVAILABLE, attachment_state::PENDING_ACCEPTANCE],
        client.timeouts.create(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_peering_attachment(api, id))
    .await
}

async fn wait_peering_attachment_deleted(
    client: &CloudClient,
    id: &str,
) -> stratus_common::Result<Option<TransitGatewayPeeringAttachment>> {
    let api = client.ec2.as_ref();
    StateChangeConf::new(
        &[
            attachment_state::AVAILABLE,
            attachment_state::DELETING,
            attachment_state::PENDING_ACCEPTANCE,
        ],
        &[],
        client.timeouts.delete(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_peering_attachment_deleting(api, id))
    .await
}
