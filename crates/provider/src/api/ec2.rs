//! EC2: carrier gateways and transit gateway peering attachments

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{Result, Tags};

pub const ERR_CARRIER_GATEWAY_NOT_FOUND: &str = "InvalidCarrierGatewayID.NotFound";
pub const ERR_TRANSIT_GATEWAY_NOT_FOUND: &str = "InvalidTransitGatewayID.NotFound";
pub const ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND: &str =
    "InvalidTransitGatewayAttachmentID.NotFound";
pub const ERR_VPC_NOT_FOUND: &str = "InvalidVpcID.NotFound";

pub mod carrier_gateway_state {
    pub const PENDING: &str = "pending";
    pub const AVAILABLE: &str = "available";
    pub const DELETING: &str = "deleting";
    pub const DELETED: &str = "deleted";
}

pub mod attachment_state {
    pub const INITIATING_REQUEST: &str = "initiatingRequest";
    pub const PENDING: &str = "pending";
    pub const PENDING_ACCEPTANCE: &str = "pendingAcceptance";
    pub const AVAILABLE: &str = "available";
    pub const DELETING: &str = "deleting";
    pub const DELETED: &str = "deleted";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierGateway {
    pub carrier_gateway_id: String,
    pub vpc_id: String,
    pub owner_id: String,
    pub state: String,
    #[serde(default)]
    pub tags: Tags,
}

/// One side of a transit gateway peering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitGatewayInfo {
    pub transit_gateway_id: String,
    pub owner_id: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitGatewayPeeringAttachment {
    pub transit_gateway_attachment_id: String,
    pub requester_tgw_info: TransitGatewayInfo,
    pub accepter_tgw_info: TransitGatewayInfo,
    pub state: String,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTransitGatewayPeeringAttachmentInput {
    pub transit_gateway_id: String,
    pub peer_transit_gateway_id: String,
    pub peer_account_id: String,
    pub peer_region: String,
    pub tags: Tags,
}

#[async_trait]
pub trait Ec2Api: Send + Sync {
    async fn create_carrier_gateway(&self, vpc_id: &str, tags: &Tags) -> Result<CarrierGateway>;

    /// Unknown ids fail with [`ERR_CARRIER_GATEWAY_NOT_FOUND`]
    async fn describe_carrier_gateways(&self, ids: &[String]) -> Result<Vec<CarrierGateway>>;

    async fn delete_carrier_gateway(&self, id: &str) -> Result<CarrierGateway>;

    async fn create_transit_gateway_peering_attachment(
        &self,
        input: &CreateTransitGatewayPeeringAttachmentInput,
    ) -> Result<TransitGatewayPeeringAttachment>;

    async fn describe_transit_gateway_peering_attachments(
        &self,
        ids: &[String],
    ) -> Result<Vec<TransitGatewayPeeringAttachment>>;

    async fn delete_transit_gateway_peering_attachment(
        &self,
        id: &str,
    ) -> Result<TransitGatewayPeeringAttachment>;

    async fn create_tags(&self, resource_id: &str, tags: &Tags) -> Result<()>;

    async fn delete_tags(&self, resource_id: &str, keys: &[String]) -> Result<()>;
}
