//! SES: receipt rule sets

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::Result;

pub const ERR_RULE_SET_DOES_NOT_EXIST: &str = "RuleSetDoesNotExist";
pub const ERR_ALREADY_EXISTS: &str = "AlreadyExists";
pub const ERR_CANNOT_DELETE: &str = "CannotDelete";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRuleSetMetadata {
    pub name: String,
    /// Unix seconds
    pub created_timestamp: i64,
}

#[async_trait]
pub trait SesApi: Send + Sync {
    async fn create_receipt_rule_set(&self, name: &str) -> Result<()>;

    async fn describe_receipt_rule_set(&self, name: &str) -> Result<ReceiptRuleSetMetadata>;

    async fn list_receipt_rule_sets(&self) -> Result<Vec<ReceiptRuleSetMetadata>>;

    /// Fails with [`ERR_CANNOT_DELETE`] while the set is active
    async fn delete_receipt_rule_set(&self, name: &str) -> Result<()>;

    /// `None` deactivates whichever set is active
    async fn set_active_receipt_rule_set(&self, name: Option<&str>) -> Result<()>;

    /// `Ok(None)` when no rule set is active
    async fn describe_active_receipt_rule_set(&self) -> Result<Option<ReceiptRuleSetMetadata>>;
}
