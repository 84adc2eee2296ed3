//! Resource lifecycle tests
//!
//! Drives each resource type through create, read, update, import and
//! delete against the simulator, including the propagation retries and
//! asynchronous waits the handlers perform.

mod common;

use common::*;
use serde_json::json;
use stratus_common::error::is_not_found;
use stratus_common::{ApiError, Error};
use stratus_provider::api::dax::DaxApi;
use stratus_provider::api::ec2::{
    ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND, ERR_TRANSIT_GATEWAY_NOT_FOUND,
};
use stratus_provider::api::servicecatalog::{ERR_INVALID_PARAMETERS, ERR_RESOURCE_NOT_FOUND};
use stratus_provider::schema::PlanAction;
use stratus_provider::DynamicValue;

const CARRIER_GATEWAY: &str = "aws_ec2_carrier_gateway";
const TGW_PEERING: &str = "aws_ec2_transit_gateway_peering_attachment";
const DAX_GROUP: &str = "aws_dax_parameter_group";
const GAMELIFT_ALIAS: &str = "aws_gamelift_alias";
const SES_RULE_SET: &str = "aws_ses_receipt_rule_set";
const SES_ACTIVE: &str = "aws_ses_active_receipt_rule_set";
const SECURITYHUB_ORG: &str = "aws_securityhub_organization_configuration";
const SC_CONSTRAINT: &str = "aws_servicecatalog_constraint";
const FSX_LUSTRE: &str = "aws_fsx_lustre_file_system";

fn role_not_ready() -> ApiError {
    ApiError::validation(
        ERR_INVALID_PARAMETERS,
        "Access denied while assuming the role: instance profile does not exist",
    )
}

fn constraint_config(parameters: &str) -> serde_json::Value {
    json!({
        "parameters": parameters,
        "portfolio_id": "port-abc123",
        "product_id": "prod-abc123",
        "type": "LAUNCH",
    })
}

#[tokio::test(start_paused = true)]
async fn test_carrier_gateway_lifecycle() {
    let h = harness();
    let config = json!({ "vpc_id": "vpc-1", "tags": { "Name": "edge" } });

    let state = h.create(CARRIER_GATEWAY, config.clone()).await;
    let id = str_attr(&state, "id").to_string();
    assert!(id.starts_with("cagw-"));
    assert_eq!(str_attr(&state, "vpc_id"), "vpc-1");
    assert_eq!(str_attr(&state, "owner_id"), "123456789012");
    assert!(str_attr(&state, "arn").ends_with(&format!("carrier-gateway/{}", id)));

    // Reads are stable
    let first = h.read(CARRIER_GATEWAY, &state).await.unwrap();
    let second = h.read(CARRIER_GATEWAY, &state).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, state);

    let plan = h
        .provider
        .plan_resource_change(CARRIER_GATEWAY, Some(&state), &value(config))
        .unwrap();
    assert_eq!(plan.action, PlanAction::NoOp);

    let state = h
        .update(
            CARRIER_GATEWAY,
            &state,
            json!({ "vpc_id": "vpc-1", "tags": { "Name": "edge-2", "Env": "test" } }),
        )
        .await;
    assert_eq!(str_attr(&state, "id"), id);
    let tags = state.get("tags").and_then(|t| t.as_map()).unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags["Name"].as_string(), Some("edge-2"));

    h.destroy(CARRIER_GATEWAY, &state).await;
    assert!(h.read(CARRIER_GATEWAY, &state).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_force_new_change_is_rejected_in_place() {
    let h = harness();
    let state = h.create(CARRIER_GATEWAY, json!({ "vpc_id": "vpc-1" })).await;

    let proposed = value(json!({ "vpc_id": "vpc-2" }));
    let plan = h
        .provider
        .plan_resource_change(CARRIER_GATEWAY, Some(&state), &proposed)
        .unwrap();
    assert_eq!(plan.action, PlanAction::Replace);
    assert_eq!(plan.requires_replace, vec!["vpc_id".to_string()]);

    let calls = h.cloud.total_calls();
    let err = h
        .provider
        .apply_resource_change(CARRIER_GATEWAY, Some(&state), &proposed)
        .await
        .unwrap_err();
    assert!(matches!(
        provider_error(&err),
        Error::ForceNewChanged { attribute, .. } if attribute == "vpc_id"
    ));
    assert_eq!(h.cloud.total_calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_carrier_gateway_unknown_vpc() {
    let h = harness();
    let err = h
        .provider
        .apply_resource_change(CARRIER_GATEWAY, None, &value(json!({ "vpc_id": "bogus" })))
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("error creating"));
}

#[tokio::test(start_paused = true)]
async fn test_import() {
    let h = harness();
    let state = h.create(CARRIER_GATEWAY, json!({ "vpc_id": "vpc-1" })).await;

    let imported = h
        .provider
        .import_resource_state(CARRIER_GATEWAY, str_attr(&state, "id"))
        .await
        .unwrap();
    assert_eq!(imported, state);

    let err = h
        .provider
        .import_resource_state(CARRIER_GATEWAY, "cagw-0000000000")
        .await
        .unwrap_err();
    assert!(is_not_found(&err));

    let err = h
        .provider
        .import_resource_state(SES_ACTIVE, "inbound")
        .await
        .unwrap_err();
    assert!(matches!(provider_error(&err), Error::ImportNotSupported(_)));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_type_and_invalid_config() {
    let h = harness();
    let err = h
        .provider
        .plan_resource_change("aws_nonexistent", None, &value(json!({})))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::UnknownResourceType(_))
    ));

    let diags = h
        .provider
        .validate_resource_config(CARRIER_GATEWAY, &value(json!({ "vpc": "vpc-1" })))
        .unwrap();
    assert_eq!(diags.len(), 2);

    let err = h
        .provider
        .apply_resource_change(CARRIER_GATEWAY, None, &value(json!({ "arn": "x", "vpc_id": "vpc-1" })))
        .await
        .unwrap_err();
    assert!(matches!(provider_error(&err), Error::Validation(_)));
    assert_eq!(h.cloud.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transit_gateway_peering_attachment() {
    let h = harness();
    // The transit gateway is not yet visible on the first attempt
    h.cloud.inject_fault(
        "CreateTransitGatewayPeeringAttachment",
        ApiError::not_found(ERR_TRANSIT_GATEWAY_NOT_FOUND, "Transit Gateway tgw-1 does not exist."),
    );

    let state = h
        .create(
            TGW_PEERING,
            json!({
                "peer_region": "us-east-1",
                "peer_transit_gateway_id": "tgw-2",
                "transit_gateway_id": "tgw-1",
                "tags": { "Side": "requester" },
            }),
        )
        .await;
    assert_eq!(h.cloud.call_count("CreateTransitGatewayPeeringAttachment"), 2);
    assert_eq!(str_attr(&state, "peer_account_id"), "123456789012");
    assert_eq!(str_attr(&state, "peer_region"), "us-east-1");
    assert!(str_attr(&state, "id").starts_with("tgw-attach-"));

    // Leaving the defaulted peer account unset is not a change
    let plan = h
        .provider
        .plan_resource_change(
            TGW_PEERING,
            Some(&state),
            &value(json!({
                "peer_region": "us-east-1",
                "peer_transit_gateway_id": "tgw-2",
                "transit_gateway_id": "tgw-1",
                "tags": { "Side": "requester" },
            })),
        )
        .unwrap();
    assert_eq!(plan.action, PlanAction::NoOp);

    h.destroy(TGW_PEERING, &state).await;
    assert!(h.read(TGW_PEERING, &state).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_transit_gateway_peering_attachment_purged_during_delete() {
    let h = harness();
    let state = h
        .create(
            TGW_PEERING,
            json!({
                "peer_region": "us-east-1",
                "peer_transit_gateway_id": "tgw-2",
                "transit_gateway_id": "tgw-1",
            }),
        )
        .await;
    let id = str_attr(&state, "id").to_string();

    // The attachment disappears outright instead of lingering as deleted
    for _ in 0..30 {
        h.cloud.inject_fault(
            "DescribeTransitGatewayPeeringAttachments",
            ApiError::not_found(
                ERR_TRANSIT_GATEWAY_ATTACHMENT_NOT_FOUND,
                format!("Transit Gateway Attachment {} was deleted or does not exist.", id),
            ),
        );
    }

    h.destroy(TGW_PEERING, &state).await;
    assert_eq!(h.cloud.call_count("DeleteTransitGatewayPeeringAttachment"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dax_parameter_group() {
    let h = harness();
    let state = h
        .create(
            DAX_GROUP,
            json!({
                "name": "cache-params",
                "parameters": [
                    { "name": "record-ttl-millis", "value": "100000" },
                    { "name": "query-ttl-millis", "value": "100000" },
                ],
            }),
        )
        .await;
    assert_eq!(str_attr(&state, "id"), "cache-params");
    assert_eq!(str_attr(&state, "description"), "");
    let params = state.get("parameters").and_then(|p| p.as_list()).unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(str_attr(&params[0], "name"), "query-ttl-millis");
    assert_eq!(str_attr(&params[0], "value"), "100000");

    let state = h
        .update(
            DAX_GROUP,
            &state,
            json!({
                "name": "cache-params",
                "parameters": [
                    { "name": "query-ttl-millis", "value": "200000" },
                    { "name": "record-ttl-millis", "value": "100000" },
                ],
            }),
        )
        .await;
    let params = state.get("parameters").and_then(|p| p.as_list()).unwrap();
    assert_eq!(str_attr(&params[0], "value"), "200000");

    let plan = h
        .provider
        .plan_resource_change(
            DAX_GROUP,
            Some(&state),
            &value(json!({ "name": "cache-params", "description": "new" })),
        )
        .unwrap();
    assert_eq!(plan.action, PlanAction::Replace);
    assert_eq!(plan.requires_replace, vec!["description".to_string()]);

    // Removed outside the provider
    h.cloud.delete_parameter_group("cache-params").await.unwrap();
    assert!(h.read(DAX_GROUP, &state).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_gamelift_alias() {
    let h = harness();
    let state = h
        .create(
            GAMELIFT_ALIAS,
            json!({
                "name": "live",
                "description": "live fleet",
                "routing_strategy": [{ "type": "SIMPLE", "fleet_id": "fleet-1" }],
                "tags": { "Team": "games" },
            }),
        )
        .await;
    assert!(str_attr(&state, "id").starts_with("alias-"));
    assert!(str_attr(&state, "arn").contains(":alias/"));
    let strategy = &state.get("routing_strategy").and_then(|s| s.as_list()).unwrap()[0];
    assert_eq!(str_attr(strategy, "fleet_id"), "fleet-1");

    let state = h
        .update(
            GAMELIFT_ALIAS,
            &state,
            json!({
                "name": "live",
                "routing_strategy": [{ "type": "TERMINAL", "message": "maintenance" }],
                "tags": { "Team": "platform" },
            }),
        )
        .await;
    let strategy = &state.get("routing_strategy").and_then(|s| s.as_list()).unwrap()[0];
    assert_eq!(str_attr(strategy, "type"), "TERMINAL");
    assert_eq!(str_attr(strategy, "message"), "maintenance");
    assert!(strategy.get("fleet_id").is_none());
    assert_eq!(str_attr(&state, "description"), "");
    let tags = state.get("tags").and_then(|t| t.as_map()).unwrap();
    assert_eq!(tags["Team"].as_string(), Some("platform"));

    // A routing strategy of the wrong shape is rejected by the service
    let err = h
        .provider
        .apply_resource_change(
            GAMELIFT_ALIAS,
            None,
            &value(json!({
                "name": "broken",
                "routing_strategy": [{ "type": "SIMPLE" }],
            })),
        )
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("SIMPLE requires a fleet id"));

    h.destroy(GAMELIFT_ALIAS, &state).await;
    assert!(h.read(GAMELIFT_ALIAS, &state).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_ses_rule_sets() {
    let h = harness();
    let rule_set = h.create(SES_RULE_SET, json!({ "rule_set_name": "inbound" })).await;
    assert_eq!(str_attr(&rule_set, "id"), "inbound");
    assert!(str_attr(&rule_set, "arn").ends_with(":receipt-rule-set/inbound"));

    let active = h.create(SES_ACTIVE, json!({ "rule_set_name": "inbound" })).await;
    assert_eq!(str_attr(&active, "id"), "inbound");
    assert_eq!(str_attr(&active, "rule_set_name"), "inbound");

    // The active set cannot be deleted
    let err = h
        .provider
        .apply_resource_change(SES_RULE_SET, Some(&rule_set), &DynamicValue::Null)
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Cannot delete active rule set"));

    h.destroy(SES_ACTIVE, &active).await;
    assert!(h.read(SES_ACTIVE, &active).await.is_none());

    h.destroy(SES_RULE_SET, &rule_set).await;
    assert!(h.read(SES_RULE_SET, &rule_set).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_ses_active_rule_set_requires_existing_set() {
    let h = harness();
    let err = h
        .provider
        .apply_resource_change(SES_ACTIVE, None, &value(json!({ "rule_set_name": "missing" })))
        .await
        .unwrap_err();
    assert!(is_not_found(&err));
}

#[tokio::test(start_paused = true)]
async fn test_securityhub_organization_configuration() {
    let h = harness();
    let state = h.create(SECURITYHUB_ORG, json!({ "auto_enable": true })).await;
    assert_eq!(str_attr(&state, "id"), "123456789012");
    assert_eq!(state.get("auto_enable").and_then(|v| v.as_bool()), Some(true));

    let state = h.update(SECURITYHUB_ORG, &state, json!({ "auto_enable": false })).await;
    assert_eq!(state.get("auto_enable").and_then(|v| v.as_bool()), Some(false));

    let imported = h
        .provider
        .import_resource_state(SECURITYHUB_ORG, "123456789012")
        .await
        .unwrap();
    assert_eq!(imported, state);

    h.destroy(SECURITYHUB_ORG, &state).await;
}

#[tokio::test(start_paused = true)]
async fn test_servicecatalog_constraint_lifecycle() {
    let h = harness();
    let state = h
        .create(SC_CONSTRAINT, constraint_config(r#"{"RoleArn": "arn:aws:iam::123456789012:role/launch"}"#))
        .await;
    assert!(str_attr(&state, "id").starts_with("cons-"));
    assert_eq!(str_attr(&state, "status"), "AVAILABLE");
    assert_eq!(str_attr(&state, "accept_language"), "en");
    assert_eq!(str_attr(&state, "owner"), "123456789012");

    // Reformatted JSON is the same document
    let plan = h
        .provider
        .plan_resource_change(
            SC_CONSTRAINT,
            Some(&state),
            &value(constraint_config(r#"{ "RoleArn":"arn:aws:iam::123456789012:role/launch" }"#)),
        )
        .unwrap();
    assert_eq!(plan.action, PlanAction::NoOp);

    let mut config = constraint_config(r#"{"RoleArn": "arn:aws:iam::123456789012:role/launch"}"#);
    config["description"] = json!("launch as role");
    let state = h.update(SC_CONSTRAINT, &state, config).await;
    assert_eq!(str_attr(&state, "description"), "launch as role");

    h.destroy(SC_CONSTRAINT, &state).await;
    assert!(h.read(SC_CONSTRAINT, &state).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_servicecatalog_constraint_waits_for_role_propagation() {
    let h = harness();
    h.cloud.inject_fault("CreateConstraint", role_not_ready());
    h.cloud.inject_fault("CreateConstraint", role_not_ready());

    let state = h
        .create(SC_CONSTRAINT, constraint_config(r#"{"LocalRoleName": "launch"}"#))
        .await;
    assert_eq!(h.cloud.call_count("CreateConstraint"), 3);
    assert_eq!(str_attr(&state, "status"), "AVAILABLE");
}

#[tokio::test(start_paused = true)]
async fn test_servicecatalog_constraint_retries_are_bounded() {
    let h = harness();
    for _ in 0..3 {
        h.cloud.inject_fault("CreateConstraint", role_not_ready());
    }

    let err = h
        .provider
        .apply_resource_change(
            SC_CONSTRAINT,
            None,
            &value(constraint_config(r#"{"LocalRoleName": "launch"}"#)),
        )
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("profile does not exist"));
    assert_eq!(h.cloud.call_count("CreateConstraint"), 3);
}

fn constraint_not_found() -> ApiError {
    ApiError::not_found(ERR_RESOURCE_NOT_FOUND, "Constraint not found")
}

#[tokio::test(start_paused = true)]
async fn test_servicecatalog_constraint_not_visible_after_create() {
    let h = harness();
    for _ in 0..25 {
        h.cloud.inject_fault("DescribeConstraint", constraint_not_found());
    }

    let err = h
        .provider
        .apply_resource_change(
            SC_CONSTRAINT,
            None,
            &value(constraint_config(r#"{"RoleArn": "arn:aws:iam::123456789012:role/launch"}"#)),
        )
        .await
        .unwrap_err();
    assert!(matches!(provider_error(&err), Error::Vanished { checks: 20 }));
    assert!(format!("{:#}", err).contains("error describing Service Catalog Constraint"));
    assert_eq!(h.cloud.call_count("CreateConstraint"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_servicecatalog_constraint_vanished_is_removed_on_read() {
    let h = harness();
    let state = h
        .create(SC_CONSTRAINT, constraint_config(r#"{"RoleArn": "arn:aws:iam::123456789012:role/launch"}"#))
        .await;

    for _ in 0..25 {
        h.cloud.inject_fault("DescribeConstraint", constraint_not_found());
    }
    assert!(h.read(SC_CONSTRAINT, &state).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_fsx_lustre_file_system() {
    let h = harness();
    let state = h
        .create(
            FSX_LUSTRE,
            json!({ "storage_capacity": 1200, "subnet_ids": ["subnet-1"] }),
        )
        .await;
    assert!(str_attr(&state, "id").starts_with("fs-"));
    assert_eq!(str_attr(&state, "deployment_type"), "SCRATCH_2");
    assert!(!str_attr(&state, "dns_name").is_empty());

    let state = h
        .update(
            FSX_LUSTRE,
            &state,
            json!({ "storage_capacity": 2400, "subnet_ids": ["subnet-1"], "tags": { "Tier": "hot" } }),
        )
        .await;
    assert_eq!(state.get("storage_capacity").and_then(|v| v.as_i64()), Some(2400));
    let tags = state.get("tags").and_then(|t| t.as_map()).unwrap();
    assert_eq!(tags["Tier"].as_string(), Some("hot"));

    h.destroy(FSX_LUSTRE, &state).await;
    assert!(h.read(FSX_LUSTRE, &state).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_fsx_failure_details_surface() {
    let h = harness();
    let err = h
        .provider
        .apply_resource_change(
            FSX_LUSTRE,
            None,
            &value(json!({ "storage_capacity": 100, "subnet_ids": ["subnet-1"] })),
        )
        .await
        .unwrap_err();
    assert!(matches!(provider_error(&err), Error::UnexpectedState { .. }));
    assert!(format!("{:#}", err).contains("below the minimum"));
}

#[tokio::test(start_paused = true)]
async fn test_fsx_create_times_out() {
    let h = harness_with(slow_config(1));
    let err = h
        .provider
        .apply_resource_change(
            FSX_LUSTRE,
            None,
            &value(json!({ "storage_capacity": 1200, "subnet_ids": ["subnet-1"] })),
        )
        .await
        .unwrap_err();
    assert!(provider_error(&err).is_timeout());
}
