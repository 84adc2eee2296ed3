//! GameLift Alias resource

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{read_back, resource_id, tag_changes, Resource};
use crate::api::gamelift::{
    CreateAliasInput, RoutingStrategy, UpdateAliasInput, ERR_NOT_FOUND, ROUTING_STRATEGY_SIMPLE,
    ROUTING_STRATEGY_TERMINAL,
};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema, Validator};
use crate::state::{
    get_block_attr, get_optional_string_attr, get_string_attr, get_string_map_attr, list_value,
    make_state, optional_string_value, string_map_value, string_value, DynamicValue,
};

pub const TYPE_NAME: &str = "aws_gamelift_alias";

pub struct GameLiftAliasResource;

#[async_trait::async_trait]
impl Resource for GameLiftAliasResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .attribute(Attribute::computed("arn", AttributeType::String))
            .attribute(
                Attribute::optional("description", AttributeType::String)
                    .validate(Validator::StringLenBetween(1, 1024)),
            )
            .attribute(
                Attribute::required("name", AttributeType::String)
                    .validate(Validator::StringLenBetween(1, 1024)),
            )
            .attribute(
                Attribute::required(
                    "routing_strategy",
                    AttributeType::List(Box::new(AttributeType::Object(vec![
                        Attribute::optional("fleet_id", AttributeType::String),
                        Attribute::optional("message", AttributeType::String),
                        Attribute::required("type", AttributeType::String).validate(
                            Validator::StringInSlice(vec![
                                ROUTING_STRATEGY_SIMPLE,
                                ROUTING_STRATEGY_TERMINAL,
                            ]),
                        ),
                    ]))),
                )
                .max_items(1),
            )
            .attribute(Attribute::tags())
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let input = CreateAliasInput {
            name: get_string_attr(config, "name"),
            description: get_optional_string_attr(config, "description"),
            routing_strategy: expand_routing_strategy(config),
            tags: get_string_map_attr(config, "tags"),
        };

        info!("Creating GameLift Alias: {:?}", input);
        let alias = client
            .gamelift
            .create_alias(&input)
            .await
            .context("error creating GameLift Alias")?;

        read_back(self, client, &alias.alias_id).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;

        debug!("Describing GameLift Alias: {}", id);
        let alias = match client.gamelift.describe_alias(&id).await {
            Ok(alias) => alias,
            Err(err) if err.has_code(ERR_NOT_FOUND) => {
                warn!("GameLift Alias ({}) not found, removing from state", id);
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("error reading GameLift Alias ({})", id))
            }
        };

        let tags = client
            .gamelift
            .list_tags_for_resource(&alias.alias_arn)
            .await
            .with_context(|| {
                format!("error listing tags for GameLift Alias ({})", alias.alias_arn)
            })?;

        Ok(Some(make_state(vec![
            ("id", string_value(&alias.alias_id)),
            ("arn", string_value(&alias.alias_arn)),
            ("description", optional_string_value(alias.description.clone())),
            ("name", string_value(&alias.name)),
            (
                "routing_strategy",
                flatten_routing_strategy(alias.routing_strategy.as_ref()),
            ),
            ("tags", string_map_value(&tags)),
        ])))
    }

    async fn update(
        &self,
        client: &CloudClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = resource_id(prior)?;

        info!("Updating GameLift Alias: {}", id);
        let alias = client
            .gamelift
            .update_alias(&UpdateAliasInput {
                alias_id: id.clone(),
                name: get_string_attr(planned, "name"),
                description: get_optional_string_attr(planned, "description"),
                routing_strategy: expand_routing_strategy(planned),
            })
            .await
            .with_context(|| format!("error updating GameLift Alias ({})", id))?;

        let (upserts, removals) = tag_changes(
            &get_string_map_attr(prior, "tags"),
            &get_string_map_attr(planned, "tags"),
        );
        let arn = alias.alias_arn;
        if !removals.is_empty() {
            client
                .gamelift
                .untag_resource(&arn, &removals)
                .await
                .with_context(|| format!("error updating GameLift Alias ({}) tags", arn))?;
        }
        if !upserts.is_empty() {
            client
                .gamelift
                .tag_resource(&arn, &upserts)
                .await
                .with_context(|| format!("error updating GameLift Alias ({}) tags", arn))?;
        }

        read_back(self, client, &id).await
    }

    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()> {
        let id = resource_id(state)?;

        info!("Deleting GameLift Alias: {}", id);
        match client.gamelift.delete_alias(&id).await {
            Ok(()) => Ok(()),
            Err(err) if err.has_code(ERR_NOT_FOUND) => Ok(()),
            Err(err) => Err(err).with_context(|| format!("error deleting GameLift Alias ({})", id)),
        }
    }
}

fn expand_routing_strategy(config: &DynamicValue) -> Option<RoutingStrategy> {
    let block = get_block_attr(config, "routing_strategy")?;
    Some(RoutingStrategy {
        strategy_type: get_string_attr(block, "type"),
        fleet_id: get_optional_string_attr(block, "fleet_id"),
        message: get_optional_string_attr(block, "message"),
    })
}

fn flatten_routing_strategy(strategy: Option<&RoutingStrategy>) -> DynamicValue {
    let Some(strategy) = strategy else {
        return list_value(Vec::new());
    };
    let mut block = make_state(vec![("type", string_value(&strategy.strategy_type))]);
    if let Some(fleet_id) = &strategy.fleet_id {
        block.set("fleet_id", string_value(fleet_id));
    }
    if let Some(message) = &strategy.message {
        block.set("message", string_value(message));
    }
    list_value(vec![block])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_strategy_drops_empty_fields() {
        let config = make_state(vec![(
            "routing_strategy",
            list_value(vec![make_state(vec![
                ("type", string_value(ROUTING_STRATEGY_TERMINAL)),
                ("fleet_id", string_value("")),
                ("message", string_value("closed for maintenance")),
            ])]),
        )]);

        let strategy = expand_routing_strategy(&config).unwrap();
        assert_eq!(strategy.fleet_id, None);
        assert_eq!(strategy.message.as_deref(), Some("closed for maintenance"));

        let flattened = flatten_routing_strategy(Some(&strategy));
        let block = get_block_attr(&make_state(vec![("routing_strategy", flattened)]), "routing_strategy")
            .cloned()
            .unwrap();
        assert!(!block.has("fleet_id"));
        assert_eq!(get_string_attr(&block, "type"), ROUTING_STRATEGY_TERMINAL);
    }

    #[test]
    fn test_missing_routing_strategy() {
        assert!(expand_routing_strategy(&make_state(vec![])).is_none());
        assert_eq!(flatten_routing_strategy(None), list_value(Vec::new()));
    }
}
