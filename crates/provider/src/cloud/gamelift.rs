use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{ApiError, Error, Result, Tags};

use super::{kind, new_id, SimulatedCloud};
use crate::api::gamelift::*;

#[derive(Debug, Serialize, Deserialize)]
struct StoredAlias {
    alias: Alias,
    tags: Tags,
}

fn alias_not_found(id: &str) -> Error {
    ApiError::not_found(ERR_NOT_FOUND, format!("Alias {} not found", id)).into()
}

fn check_routing_strategy(strategy: Option<&RoutingStrategy>) -> Result<()> {
    let Some(strategy) = strategy else {
        return Err(ApiError::validation(ERR_INVALID_REQUEST, "RoutingStrategy is required").into());
    };
    let ok = match strategy.strategy_type.as_str() {
        ROUTING_STRATEGY_SIMPLE => strategy.fleet_id.is_some(),
        ROUTING_STRATEGY_TERMINAL => strategy.message.is_some(),
        _ => false,
    };
    if !ok {
        return Err(ApiError::validation(
            ERR_INVALID_REQUEST,
            format!(
                "Invalid routing strategy {}: SIMPLE requires a fleet id and TERMINAL a message",
                strategy.strategy_type
            ),
        )
        .into());
    }
    Ok(())
}

impl SimulatedCloud {
    fn stored_alias(&self, id: &str) -> Result<StoredAlias> {
        self.db
            .get::<StoredAlias>(kind::GAMELIFT_ALIAS, id)?
            .map(|row| row.body)
            .ok_or_else(|| alias_not_found(id))
    }

    /// Alias id from either an id or an alias ARN
    fn alias_id_from_arn(arn: &str) -> &str {
        arn.rsplit_once("alias/").map(|(_, id)| id).unwrap_or(arn)
    }
}

#[async_trait]
impl GameLiftApi for SimulatedCloud {
    async fn create_alias(&self, input: &CreateAliasInput) -> Result<Alias> {
        self.enter("CreateAlias")?;
        check_routing_strategy(input.routing_strategy.as_ref())?;

        let alias_id = new_id("alias");
        let alias = Alias {
            alias_arn: self.arn("gamelift", format!("alias/{}", alias_id)),
            alias_id,
            name: input.name.clone(),
            description: input.description.clone(),
            routing_strategy: input.routing_strategy.clone(),
        };
        let stored = StoredAlias {
            alias: alias.clone(),
            tags: input.tags.clone(),
        };
        self.db
            .insert(kind::GAMELIFT_ALIAS, &alias.alias_id, &alias.name, &stored, "", None)?;
        Ok(alias)
    }

    async fn describe_alias(&self, alias_id: &str) -> Result<Alias> {
        self.enter("DescribeAlias")?;
        Ok(self.stored_alias(alias_id)?.alias)
    }

    async fn update_alias(&self, input: &UpdateAliasInput) -> Result<Alias> {
        self.enter("UpdateAlias")?;
        check_routing_strategy(input.routing_strategy.as_ref())?;
        let mut stored = self.stored_alias(&input.alias_id)?;

        stored.alias.name = input.name.clone();
        stored.alias.description = input.description.clone();
        stored.alias.routing_strategy = input.routing_strategy.clone();
        self.db.update(kind::GAMELIFT_ALIAS, &input.alias_id, &stored)?;
        Ok(stored.alias)
    }

    async fn delete_alias(&self, alias_id: &str) -> Result<()> {
        self.enter("DeleteAlias")?;
        if !self.db.delete(kind::GAMELIFT_ALIAS, alias_id)? {
            return Err(alias_not_found(alias_id));
        }
        Ok(())
    }

    async fn list_tags_for_resource(&self, arn: &str) -> Result<Tags> {
        self.enter("ListTagsForResource")?;
        Ok(self.stored_alias(Self::alias_id_from_arn(arn))?.tags)
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()> {
        self.enter("TagResource")?;
        let id = Self::alias_id_from_arn(arn);
        let mut stored = self.stored_alias(id)?;
        stored
            .tags
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.db.update(kind::GAMELIFT_ALIAS, id, &stored)?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> Result<()> {
        self.enter("UntagResource")?;
        let id = Self::alias_id_from_arn(arn);
        let mut stored = self.stored_alias(id)?;
        for key in keys {
            stored.tags.remove(key);
        }
        self.db.update(kind::GAMELIFT_ALIAS, id, &stored)?;
        Ok(())
    }
}
