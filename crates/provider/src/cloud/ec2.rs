use async_trait::async_trait;
use stratus_common::{ApiError, Result, Tags};

use super::{kind, new_id, SimulatedCloud};
use crate::api::ec2::*;

impl SimulatedCloud {
    fn carrier_gateway(&self, id: &str) -> Result<Option<CarrierGateway>> {
        Ok(self
            .observe::<CarrierGateway>(kind::CARRIER_GATEWAY, id)?
            .map(|row| CarrierGateway {
                state: row.status,
                ..row.body
            }))
    }

    fn peering_attachment(&self, id: &str) -> Result<Option<TransitGatewayPeeringAttachment>> {
        Ok(self
            .observe::<TransitGatewayPeeringAttachment>(kind::TGW_PEERING_ATTACHMENT, id)?
            .map(|row| TransitGatewayPeeringAttachment {
                state: row.status,
                ..row.body
            }))
    }

    /// Kind of the EC2 record an id refers to, judged by its prefix
    fn ec2_kind(resource_id: &str) -> Option<&'static str> {
        if resource_id.starts_with("cagw-") {
            Some(kind::CARRIER_GATEWAY)
        } else if resource_id.starts_with("tgw-attach-") {
            Some(kind::TGW_PEERING_ATTACHMENT)
        } else {
            None
        }
    }

    fn modify_ec2_tags(&self, resource_id: &str, f: impl FnOnce(&mut Tags)) -> Result<()> {
        let not_found = || {
            ApiError::not_found(
                "InvalidID",
                format!("The ID '{}' is not valid", resource_id),
            )
        };
        let kind = Self::ec2_kind(resource_id).ok_or_else(not_found)?;
        let mut body = self
            .db
            .get::<serde_json::Value>(kind, resource_id)?
            .ok_or_else(not_found)?
            .body;

        let mut tags: Tags = body
            .get("tags")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();
        f(&mut tags);
        body["tags"] = serde_json::to_value(&tags)?;
        self.db.update(kind, resource_id, &body)?;
        Ok(())
    }
}

#[async_trait]
impl Ec2Api for SimulatedCloud {
    async fn create_carrier_gateway(&self, vpc_id: &str, tags: &Tags) -> Result<CarrierGateway> {
        self.enter("CreateCarrierGateway")?;
        if !vpc_id.starts_with("vpc-") {
            return Err(ApiError::not_found(
                ERR_VPC_NOT_FOUND,
                format!("The vpc ID '{}' does not exist", vpc_id),
            )
            .into());
        }

        let gateway = CarrierGateway {
            carrier_gateway_id: new_id("cagw"),
            vpc_id: vpc_id.to_string(),
            owner_id: self.account_id.clone(),
            state: carrier_gateway_state::PENDING.to_string(),
            tags: tags.clone(),
        };
        self.db.insert(
            kind::CARRIER_GATEWAY,
            &gateway.carrier_gateway_id,
            "",
            &gateway,
            &gateway.state,
            Some(&self.settling(carrier_gateway_state::AVAILABLE)),
        )?;
        Ok(gateway)
    }

    async fn describe_carrier_gateways(&self, ids: &[String]) -> Result<Vec<CarrierGateway>> {
        self.enter("DescribeCarrierGateways")?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.carrier_gateway(id)? {
                Some(gw) => out.push(gw),
                None => {
                    return Err(ApiError::not_found(
                        ERR_CARRIER_GATEWAY_NOT_FOUND,
                        format!("The CarrierGateway ID '{}' does not exist", id),
                    )
                    .into())
                }
            }
        }
        Ok(out)
    }

    async fn delete_carrier_gateway(&self, id: &str) -> Result<CarrierGateway> {
        self.enter("DeleteCarrierGateway")?;
        let current = self
            .db
            .get::<CarrierGateway>(kind::CARRIER_GATEWAY, id)?
            .filter(|row| row.status != carrier_gateway_state::DELETED)
            .ok_or_else(|| {
                ApiError::not_found(
                    ERR_CARRIER_GATEWAY_NOT_FOUND,
                    format!("The CarrierGateway ID '{}' does not exist", id),
                )
            })?;

        if current.status != carrier_gateway_state::DELETING {
            // Deleted gateways stay visible in the deleted state
            self.db.set_status(
                kind::CARRIER_GATEWAY,
                id,
                carrier_gateway_state::DELETING,
                Some(&self.settling(carrier_gateway_state::DELETED)),
            )?;
        }
        Ok(CarrierGateway {
            state: carrier_gateway_state::DELETING.to_string(),
            ..current.body
        })
    }

    async fn create_transit_gateway_peering_attachment(
        &self,
        input: &CreateTransitGatewayPeeringAttachmentInput,
    ) -> Result<TransitGatewayPeeringAttachment> {
        self.enter("CreateTransitGatewayPeeringAttachment")?;
        for tgw in [&input.transit_gateway_id, &input.peer_transit_gateway_id] {
            if !tgw.starts_with("tgw-") {
                return Err(ApiError::not_found(
                    ERR_TRANSIT_GATEWAY_NOT_FOUND,
                    format!("Transit Gateway {} was deleted or does not exist.", tgw),
                )
                .into());
            }
        }

        // Same-account peerings are accepted automatically
        let target = if input.peer_account_id == self.account_id {
            attachment_state::AVAILABLE
        } else {
            attachment_state::PENDING_ACCEPTANCE
        };

        let attachment = TransitGatewayPeeringAttachment {
            transit_gateway_attachment_id: new_id("tgw-attach"),
            requester_tgw_info: TransitGatewayInfo {
                transit_gateway_id: input.transit_gateway_id.clone(),
                owner_id: self.account_id.clone(),
                region: self.region.clone(),
            },
            accepter_tgw_info: TransitGatewayInfo {
                transit_gateway_id: input.peer_transit_gateway_id.clone(),
                owner_id: input.peer_account_id.clone(),
                region: input.peer_region.clone(),
            },
            state: attachment_state::INITIATING_REQUEST.to_string(),
            tags: input.tags.clone(),
        };
        self.db.insert(
            kind::TGW_PEERING_ATTACHMENT,
            &attachment.transit_gateway_attachment_id,
            "",
            &attachment,
            &attachment.state,
            Some(&self.settling(target)),
        )?;
        Ok(attachment)
    }

    async fn describe_transit_gateway_peering_attachments(
        &self,
        ids: &[String],
    ) -> Result<Vec<TransitGatewayPeeringAttachment>> {
        self.enter("DescribeTransitGatewayPeeringAttachments")?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.peering_attachment(id)? {
                Some(a) => out.push(a),
                None => {
                    return Err(ApiError::not_found(
                        ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND,
                        format!("Transit Gateway Attachment {} was deleted or does not exist.", id),
                    )
                    .into())
                }
            }
        }
        Ok(out)
    }

    async fn delete_transit_gateway_peering_attachment(
        &self,
        id: &str,
    ) -> Result<TransitGatewayPeeringAttachment> {
        self.enter("DeleteTransitGatewayPeeringAttachment")?;
        let current = self
            .db
            .get::<TransitGatewayPeeringAttachment>(kind::TGW_PEERING_ATTACHMENT, id)?
            .filter(|row| row.status != attachment_state::DELETED)
            .ok_or_else(|| {
                ApiError::not_found(
                    ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND,
                    format!("Transit Gateway Attachment {} was deleted or does not exist.", id),
                )
            })?;

        if current.status != attachment_state::DELETING {
            self.db.set_status(
                kind::TGW_PEERING_ATTACHMENT,
                id,
                attachment_state::DELETING,
                Some(&self.settling(attachment_state::DELETED)),
            )?;
        }
        Ok(TransitGatewayPeeringAttachment {
            state: attachment_state::DELETING.to_string(),
            ..current.body
        })
    }

    async fn create_tags(&self, resource_id: &str, tags: &Tags) -> Result<()> {
        self.enter("CreateTags")?;
        self.modify_ec2_tags(resource_id, |current| {
            current.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        })
    }

    async fn delete_tags(&self, resource_id: &str, keys: &[String]) -> Result<()> {
        self.enter("DeleteTags")?;
        self.modify_ec2_tags(resource_id, |current| {
            for key in keys {
                current.remove(key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_common::{Database, ProviderConfig};

    fn sim() -> SimulatedCloud {
        SimulatedCloud::new(Database::open_memory().unwrap(), &ProviderConfig::default())
    }

    #[tokio::test]
    async fn test_carrier_gateway_lifecycle() {
        let sim = sim();
        let gw = sim
            .create_carrier_gateway("vpc-1", &Tags::new())
            .await
            .unwrap();
        let ids = vec![gw.carrier_gateway_id.clone()];

        let states: Vec<String> = {
            let mut v = Vec::new();
            for _ in 0..2 {
                v.push(sim.describe_carrier_gateways(&ids).await.unwrap()[0].state.clone());
            }
            v
        };
        assert_eq!(states, vec!["pending", "available"]);

        sim.delete_carrier_gateway(&gw.carrier_gateway_id).await.unwrap();
        let first = sim.describe_carrier_gateways(&ids).await.unwrap();
        assert_eq!(first[0].state, "deleting");
        let second = sim.describe_carrier_gateways(&ids).await.unwrap();
        assert_eq!(second[0].state, "deleted");

        let err = sim
            .delete_carrier_gateway(&gw.carrier_gateway_id)
            .await
            .unwrap_err();
        assert!(err.api_error().unwrap().code_equals(ERR_CARRIER_GATEWAY_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_unknown_gateway_is_not_found() {
        let sim = sim();
        let err = sim
            .describe_carrier_gateways(&["cagw-missing".to_string()])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_tags() {
        let sim = sim();
        let mut tags = Tags::new();
        tags.insert("a".to_string(), "1".to_string());
        let gw = sim.create_carrier_gateway("vpc-1", &tags).await.unwrap();

        let mut more = Tags::new();
        more.insert("b".to_string(), "2".to_string());
        sim.create_tags(&gw.carrier_gateway_id, &more).await.unwrap();
        sim.delete_tags(&gw.carrier_gateway_id, &["a".to_string()])
            .await
            .unwrap();

        let got = sim
            .describe_carrier_gateways(&[gw.carrier_gateway_id.clone()])
            .await
            .unwrap();
        assert_eq!(got[0].tags, more);
    }

    #[tokio::test]
    async fn test_cross_account_peering_waits_for_acceptance() {
        let sim = sim();
        let input = CreateTransitGatewayPeeringAttachmentInput {
            transit_gateway_id: "tgw-a".to_string(),
            peer_transit_gateway_id: "tgw-b".to_string(),
            peer_account_id: "210987654321".to_string(),
            peer_region: "eu-west-1".to_string(),
            tags: Tags::new(),
        };
        let att = sim
            .create_transit_gateway_peering_attachment(&input)
            .await
            .unwrap();
        let ids = vec![att.transit_gateway_attachment_id.clone()];
        sim.describe_transit_gateway_peering_attachments(&ids)
            .await
            .unwrap();
        let settled = sim
            .describe_transit_gateway_peering_attachments(&ids)
            .await
            .unwrap();
        assert_eq!(settled[0].state, attachment_state::PENDING_ACCEPTANCE);
        assert_eq!(settled[0].accepter_tgw_info.region, "eu-west-1");
    }
}
