use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{ApiError, Error, Result, Tags};

use super::{kind, new_id, SimulatedCloud};
use crate::api::route53resolver::*;

/// Resolver rule to place in the simulated account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedResolverRule {
    pub name: String,
    pub domain_name: String,
    pub rule_type: String,
    pub resolver_endpoint_id: Option<String>,
    pub share_status: String,
    /// Owner account; the caller's account when unset
    pub owner_id: Option<String>,
    pub status: String,
    pub tags: Tags,
}

impl Default for SeedResolverRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            domain_name: String::new(),
            rule_type: "FORWARD".to_string(),
            resolver_endpoint_id: None,
            share_status: SHARE_STATUS_NOT_SHARED.to_string(),
            owner_id: None,
            status: RULE_STATUS_COMPLETE.to_string(),
            tags: Tags::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRule {
    rule: ResolverRule,
    tags: Tags,
}

fn rule_not_found(id: &str) -> Error {
    ApiError::not_found(
        ERR_RESOURCE_NOT_FOUND,
        format!("Resolver rule with ID '{}' does not exist.", id),
    )
    .into()
}

fn matches(rule: &ResolverRule, filter: &Filter) -> bool {
    let value = match filter.name.as_str() {
        "DOMAIN_NAME" => rule.domain_name.as_str(),
        "NAME" => rule.name.as_str(),
        "RESOLVER_ENDPOINT_ID" => rule.resolver_endpoint_id.as_deref().unwrap_or(""),
        "TYPE" => rule.rule_type.as_str(),
        _ => return false,
    };
    filter.values.iter().any(|v| {
        // The service stores domain names fully qualified
        v == value || (filter.name == "DOMAIN_NAME" && format!("{}.", v) == value)
    })
}

impl SimulatedCloud {
    /// Place a resolver rule in the simulated account, returning its id
    pub fn seed_resolver_rule(&self, seed: &SeedResolverRule) -> Result<String> {
        let id = new_id("rslvr-rr");
        let domain_name = if seed.domain_name.ends_with('.') {
            seed.domain_name.clone()
        } else {
            format!("{}.", seed.domain_name)
        };
        let owner_id = seed
            .owner_id
            .clone()
            .unwrap_or_else(|| self.account_id.clone());
        let rule = ResolverRule {
            arn: self.arn("route53resolver", format!("resolver-rule/{}", id)),
            id: id.clone(),
            domain_name,
            name: seed.name.clone(),
            owner_id,
            resolver_endpoint_id: seed.resolver_endpoint_id.clone(),
            rule_type: seed.rule_type.clone(),
            share_status: seed.share_status.clone(),
            status: seed.status.clone(),
        };
        let stored = StoredRule {
            rule,
            tags: seed.tags.clone(),
        };
        self.db
            .insert(kind::RESOLVER_RULE, &id, &seed.name, &stored, &seed.status, None)?;
        Ok(id)
    }
}

#[async_trait]
impl Route53ResolverApi for SimulatedCloud {
    async fn get_resolver_rule(&self, id: &str) -> Result<ResolverRule> {
        self.enter("GetResolverRule")?;
        self.db
            .get::<StoredRule>(kind::RESOLVER_RULE, id)?
            .map(|row| row.body.rule)
            .ok_or_else(|| rule_not_found(id))
    }

    async fn list_resolver_rules(&self, filters: &[Filter]) -> Result<Vec<ResolverRule>> {
        self.enter("ListResolverRules")?;
        Ok(self
            .db
            .list::<StoredRule>(kind::RESOLVER_RULE)?
            .into_iter()
            .map(|row| row.body.rule)
            .filter(|rule| filters.iter().all(|f| matches(rule, f)))
            .collect())
    }

    async fn list_tags_for_resource(&self, arn: &str) -> Result<Tags> {
        self.enter("ListTagsForResource")?;
        let id = arn.rsplit_once("resolver-rule/").map(|(_, id)| id).unwrap_or(arn);
        self.db
            .get::<StoredRule>(kind::RESOLVER_RULE, id)?
            .map(|row| row.body.tags)
            .ok_or_else(|| rule_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_common::{Database, ProviderConfig};

    #[tokio::test]
    async fn test_filters() {
        let sim = SimulatedCloud::new(Database::open_memory().unwrap(), &ProviderConfig::default());
        sim.seed_resolver_rule(&SeedResolverRule {
            name: "corp".to_string(),
            domain_name: "corp.example.com".to_string(),
            ..Default::default()
        })
        .unwrap();
        sim.seed_resolver_rule(&SeedResolverRule {
            name: "lab".to_string(),
            domain_name: "lab.example.com".to_string(),
            rule_type: "SYSTEM".to_string(),
            ..Default::default()
        })
        .unwrap();

        let by_domain = sim
            .list_resolver_rules(&[Filter {
                name: "DOMAIN_NAME".to_string(),
                values: vec!["corp.example.com".to_string()],
            }])
            .await
            .unwrap();
        assert_eq!(by_domain.len(), 1);
        assert_eq!(by_domain[0].domain_name, "corp.example.com.");

        assert_eq!(sim.list_resolver_rules(&[]).await.unwrap().len(), 2);
        let system = sim
            .list_resolver_rules(&[Filter {
                name: "TYPE".to_string(),
                values: vec!["SYSTEM".to_string()],
            }])
            .await
            .unwrap();
        assert_eq!(system[0].name, "lab");
    }
}
