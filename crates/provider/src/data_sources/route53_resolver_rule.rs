//! Route53 Resolver Rule data source

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use super::DataSource;
use crate::api::route53resolver::{
    Filter, ResolverRule, ERR_RESOURCE_NOT_FOUND, RULE_STATUS_DELETED, RULE_TYPES,
    SHARE_STATUS_SHARED_WITH_ME,
};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema, Validator};
use crate::state::{
    get_optional_string_attr, make_state, optional_string_value, string_map_value, string_value,
    DynamicValue,
};

pub const TYPE_NAME: &str = "aws_route53_resolver_rule";

/// Filter attributes and the service filter each one maps to
const FILTERS: &[(&str, &str)] = &[
    ("domain_name", "DOMAIN_NAME"),
    ("name", "NAME"),
    ("resolver_endpoint_id", "RESOLVER_ENDPOINT_ID"),
    ("rule_type", "TYPE"),
];

pub struct Route53ResolverRuleDataSource;

#[async_trait::async_trait]
impl DataSource for Route53ResolverRuleDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        let filter_names: Vec<&'static str> = FILTERS.iter().map(|(attr, _)| *attr).collect();
        ResourceSchema::new(TYPE_NAME)
            .attribute(Attribute::computed("arn", AttributeType::String))
            .attribute(
                Attribute::optional_computed("domain_name", AttributeType::String)
                    .validate(Validator::StringLenBetween(1, 256))
                    .conflicts_with(&["resolver_rule_id"]),
            )
            .attribute(
                Attribute::optional_computed("name", AttributeType::String)
                    .conflicts_with(&["resolver_rule_id"]),
            )
            .attribute(Attribute::computed("owner_id", AttributeType::String))
            .attribute(
                Attribute::optional_computed("resolver_endpoint_id", AttributeType::String)
                    .conflicts_with(&["resolver_rule_id"]),
            )
            .attribute(
                Attribute::optional_computed("resolver_rule_id", AttributeType::String)
                    .conflicts_with(&filter_names),
            )
            .attribute(
                Attribute::optional_computed("rule_type", AttributeType::String)
                    .validate(Validator::StringInSlice(RULE_TYPES.to_vec()))
                    .conflicts_with(&["resolver_rule_id"]),
            )
            .attribute(Attribute::computed("share_status", AttributeType::String))
            .attribute(Attribute::computed(
                "tags",
                AttributeType::Map(Box::new(AttributeType::String)),
            ))
    }

    async fn read(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let api = client.route53resolver.as_ref();

        let rule = if let Some(id) = get_optional_string_attr(config, "resolver_rule_id") {
            debug!("Reading Route53 Resolver rule {}", id);
            let rule = match api.get_resolver_rule(&id).await {
                Ok(rule) => Some(rule),
                Err(err) if err.has_code(ERR_RESOURCE_NOT_FOUND) => None,
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("error getting Route53 Resolver rule ({})", id))
                }
            };
            match rule {
                Some(rule) if rule.status != RULE_STATUS_DELETED => rule,
                _ => {
                    return Err(anyhow!(
                        "no Route53 Resolver rules matched found with the id ({:?})",
                        id
                    ))
                }
            }
        } else {
            let filters = build_filters(config);
            debug!("Listing Route53 Resolver rules: {:?}", filters);
            let mut rules = api
                .list_resolver_rules(&filters)
                .await
                .context("error getting Route53 Resolver rules")?;
            match rules.len() {
                0 => return Err(anyhow!("no Route53 Resolver rules matched")),
                1 => rules.remove(0),
                n => {
                    return Err(anyhow!(
                        "{} Route53 Resolver rules matched; use additional constraints to reduce matches to a single rule",
                        n
                    ))
                }
            }
        };

        // Rules shared with this account carry the owner's tags, which are not
        // readable here
        let tags = if rule.share_status != SHARE_STATUS_SHARED_WITH_ME {
            api.list_tags_for_resource(&rule.arn)
                .await
                .with_context(|| {
                    format!("error listing tags for Route53 Resolver rule ({})", rule.arn)
                })?
        } else {
            Default::default()
        };

        Ok(rule_to_state(&rule, &tags))
    }
}

/// Service filters for every filter attribute set in `config`
fn build_filters(config: &DynamicValue) -> Vec<Filter> {
    FILTERS
        .iter()
        .filter_map(|(attr, filter)| {
            get_optional_string_attr(config, attr).map(|value| Filter {
                name: filter.to_string(),
                values: vec![value],
            })
        })
        .collect()
}

fn rule_to_state(rule: &ResolverRule, tags: &stratus_common::Tags) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&rule.id)),
        ("arn", string_value(&rule.arn)),
        (
            "domain_name",
            string_value(rule.domain_name.trim_end_matches('.')),
        ),
        ("name", string_value(&rule.name)),
        ("owner_id", string_value(&rule.owner_id)),
        (
            "resolver_endpoint_id",
            optional_string_value(rule.resolver_endpoint_id.clone()),
        ),
        ("resolver_rule_id", string_value(&rule.id)),
        ("rule_type", string_value(&rule.rule_type)),
        ("share_status", string_value(&rule.share_status)),
        ("tags", string_map_value(tags)),
    ])
}
