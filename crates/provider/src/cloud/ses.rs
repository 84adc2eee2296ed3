use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{ApiError, Error, Result};

use super::{kind, SimulatedCloud};
use crate::api::ses::*;

const ACTIVE_RULE_SET_KEY: &str = "ses.active_receipt_rule_set";

#[derive(Debug, Serialize, Deserialize)]
struct StoredRuleSet {
    name: String,
}

fn rule_set_missing(name: &str) -> Error {
    ApiError::not_found(
        ERR_RULE_SET_DOES_NOT_EXIST,
        format!("Rule set does not exist: {}", name),
    )
    .into()
}

impl SimulatedCloud {
    fn rule_set_metadata(&self, name: &str) -> Result<Option<ReceiptRuleSetMetadata>> {
        Ok(self
            .db
            .get::<StoredRuleSet>(kind::SES_RULE_SET, name)?
            .map(|row| ReceiptRuleSetMetadata {
                name: row.body.name,
                created_timestamp: row.created_at,
            }))
    }

    /// Create a rule set directly, bypassing fault injection
    pub fn seed_rule_set(&self, name: &str) -> Result<()> {
        if !self.db.exists(kind::SES_RULE_SET, name)? {
            let stored = StoredRuleSet {
                name: name.to_string(),
            };
            self.db
                .insert(kind::SES_RULE_SET, name, name, &stored, "", None)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SesApi for SimulatedCloud {
    async fn create_receipt_rule_set(&self, name: &str) -> Result<()> {
        self.enter("CreateReceiptRuleSet")?;
        if self.db.exists(kind::SES_RULE_SET, name)? {
            return Err(ApiError::conflict(
                ERR_ALREADY_EXISTS,
                format!("Rule set already exists: {}", name),
            )
            .into());
        }
        self.seed_rule_set(name)
    }

    async fn describe_receipt_rule_set(&self, name: &str) -> Result<ReceiptRuleSetMetadata> {
        self.enter("DescribeReceiptRuleSet")?;
        self.rule_set_metadata(name)?
            .ok_or_else(|| rule_set_missing(name))
    }

    async fn list_receipt_rule_sets(&self) -> Result<Vec<ReceiptRuleSetMetadata>> {
        self.enter("ListReceiptRuleSets")?;
        Ok(self
            .db
            .list::<StoredRuleSet>(kind::SES_RULE_SET)?
            .into_iter()
            .map(|row| ReceiptRuleSetMetadata {
                name: row.body.name,
                created_timestamp: row.created_at,
            })
            .collect())
    }

    async fn delete_receipt_rule_set(&self, name: &str) -> Result<()> {
        self.enter("DeleteReceiptRuleSet")?;
        if self.db.kv_get(ACTIVE_RULE_SET_KEY)?.as_deref() == Some(name) {
            return Err(ApiError::conflict(
                ERR_CANNOT_DELETE,
                format!("Cannot delete active rule set: {}", name),
            )
            .into());
        }
        // Deleting a set that does not exist succeeds
        self.db.delete(kind::SES_RULE_SET, name)?;
        Ok(())
    }

    async fn set_active_receipt_rule_set(&self, name: Option<&str>) -> Result<()> {
        self.enter("SetActiveReceiptRuleSet")?;
        match name {
            Some(name) => {
                if !self.db.exists(kind::SES_RULE_SET, name)? {
                    return Err(rule_set_missing(name));
                }
                self.db.kv_set(ACTIVE_RULE_SET_KEY, name)?;
            }
            None => self.db.kv_delete(ACTIVE_RULE_SET_KEY)?,
        }
        Ok(())
    }

    async fn describe_active_receipt_rule_set(&self) -> Result<Option<ReceiptRuleSetMetadata>> {
        self.enter("DescribeActiveReceiptRuleSet")?;
        match self.db.kv_get(ACTIVE_RULE_SET_KEY)? {
            Some(name) => self.rule_set_metadata(&name),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_common::{Database, ProviderConfig};

    #[tokio::test]
    async fn test_active_rule_set() {
        let sim = SimulatedCloud::new(Database::open_memory().unwrap(), &ProviderConfig::default());

        assert!(sim.set_active_receipt_rule_set(Some("inbound")).await.is_err());
        sim.create_receipt_rule_set("inbound").await.unwrap();
        sim.set_active_receipt_rule_set(Some("inbound")).await.unwrap();

        let active = sim.describe_active_receipt_rule_set().await.unwrap().unwrap();
        assert_eq!(active.name, "inbound");

        let err = sim.delete_receipt_rule_set("inbound").await.unwrap_err();
        assert!(err.api_error().unwrap().code_equals(ERR_CANNOT_DELETE));

        sim.set_active_receipt_rule_set(None).await.unwrap();
        assert!(sim.describe_active_receipt_rule_set().await.unwrap().is_none());
        sim.delete_receipt_rule_set("inbound").await.unwrap();
        assert!(sim.list_receipt_rule_sets().await.unwrap().is_empty());
    }
}
