//! EC2 Carrier Gateway resource

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{read_back, resource_id, tag_changes, Resource};
use crate::api::ec2::{carrier_gateway_state, CarrierGateway, Ec2Api, ERR_CARRIER_GATEWAY_NOT_FOUND};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema};
use crate::state::{get_string_attr, get_string_map_attr, make_state, string_map_value, string_value, DynamicValue};
use crate::waiter::StateChangeConf;

pub const TYPE_NAME: &str = "aws_ec2_carrier_gateway";

pub struct CarrierGatewayResource;

#[async_trait::async_trait]
impl Resource for CarrierGatewayResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .with_description("Carrier gateway connecting a Wavelength zone VPC to the carrier network")
            .attribute(Attribute::computed("arn", AttributeType::String))
            .attribute(Attribute::computed("owner_id", AttributeType::String))
            .attribute(Attribute::tags())
            .attribute(Attribute::required("vpc_id", AttributeType::String).force_new())
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let vpc_id = get_string_attr(config, "vpc_id");
        let tags = get_string_map_attr(config, "tags");

        debug!("Creating EC2 Carrier Gateway in {}", vpc_id);
        let gateway = client
            .ec2
            .create_carrier_gateway(&vpc_id, &tags)
            .await
            .context("error creating EC2 Carrier Gateway")?;
        let id = gateway.carrier_gateway_id;
        info!("Created EC2 Carrier Gateway {}", id);

        wait_carrier_gateway_available(client, &id)
            .await
            .with_context(|| {
                format!("error waiting for EC2 Carrier Gateway ({}) to become available", id)
            })?;

        read_back(self, client, &id).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;
        let gateway = find_carrier_gateway(client.ec2.as_ref(), &id)
            .await
            .with_context(|| format!("error reading EC2 Carrier Gateway ({})", id))?;

        match gateway {
            Some(gw) if gw.state != carrier_gateway_state::DELETED => {
                Ok(Some(carrier_gateway_to_state(client, &gw)))
            }
            _ => {
                warn!("EC2 Carrier Gateway ({}) not found, removing from state", id);
                Ok(None)
            }
        }
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

        if !removals.is_empty() {
            client
                .ec2
                .delete_tags(&id, &removals)
                .await
                .with_context(|| format!("error updating EC2 Carrier Gateway ({}) tags", id))?;
        }
        if !upserts.is_empty() {
            client
                .ec2
                .create_tags(&id, &upserts)
                .await
                .with_context(|| format!("error updating EC2 Carrier Gateway ({}) tags", id))?;
        }

        read_back(self, client, &id).await
    }

    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()> {
        let id = resource_id(state)?;

        info!("Deleting EC2 Carrier Gateway ({})", id);
        if let Err(err) = client.ec2.delete_carrier_gateway(&id).await {
            if err.has_code(ERR_CARRIER_GATEWAY_NOT_FOUND) {
                return Ok(());
            }
            return Err(err).with_context(|| format!("error deleting EC2 Carrier Gateway ({})", id));
        }

        wait_carrier_gateway_deleted(client, &id)
            .await
            .with_context(|| format!("error waiting for EC2 Carrier Gateway ({}) to be deleted", id))?;
        Ok(())
    }
}

async fn find_carrier_gateway(
    api: &dyn Ec2Api,
    id: &str,
) -> stratus_common::Result<Option<CarrierGateway>> {
    match api.describe_carrier_gateways(&[id.to_string()]).await {
        Ok(gateways) => Ok(gateways.into_iter().find(|gw| gw.carrier_gateway_id == id)),
        Err(err) if err.has_code(ERR_CARRIER_GATEWAY_NOT_FOUND) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Gateways in the deleted state count as absent
async fn status_carrier_gateway(
    api: &dyn Ec2Api,
    id: &str,
) -> stratus_common::Result<Option<(CarrierGateway, String)>> {
    Ok(find_carrier_gateway(api, id)
        .await?
        .filter(|gw| gw.state != carrier_gateway_state::DELETED)
        .map(|gw| {
            let state = gw.state.clone();
            (gw, state)
        }))
}

async fn wait_carrier_gateway_available(
    client: &CloudClient,
    id: &str,
) -> stratus_common::Result<Option<CarrierGateway>> {
    let api = client.ec2.as_ref();
    StateChangeConf::new(
        &[carrier_gateway_state::PENDING],
        &[carrier_gateway_state::AVAILABLE],
        client.timeouts.create(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_carrier_gateway(api, id))
    .await
}

async fn wait_carrier_gateway_deleted(
    client: &CloudClient,
    id: &str,
) -> stratus_common::Result<Option<CarrierGateway>> {
    let api = client.ec2.as_ref();
    StateChangeConf::new(
        &[carrier_gateway_state::DELETING],
        &[],
        client.timeouts.delete(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_carrier_gateway(api, id))
    .await
}

fn carrier_gateway_to_state(client: &CloudClient, gw: &CarrierGateway) -> DynamicValue {
    let arn = client.arn(
        "ec2",
        &gw.owner_id,
        format!("carrier-gateway/{}", gw.carrier_gateway_id),
    );
    make_state(vec![
        ("id", string_value(&gw.carrier_gateway_id)),
        ("arn", string_value(arn.to_string())),
        ("owner_id", string_value(&gw.owner_id)),
        ("vpc_id", string_value(&gw.vpc_id)),
        ("tags", string_map_value(&gw.tags)),
    ])
}
