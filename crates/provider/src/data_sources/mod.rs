//! Data Source Implementations
//!
//! Read-only lookups of objects the provider does not manage.

pub mod route53_resolver_rule;

use anyhow::Result;

use crate::client::CloudClient;
use crate::schema::ResourceSchema;
use crate::state::DynamicValue;

/// Trait for data source lookups
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Data source type name
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    /// Look up exactly one object matching `config`
    async fn read(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue>;
}

/// All data sources this provider serves
pub fn all() -> Vec<Box<dyn DataSource>> {
    vec![Box::new(route53_resolver_rule::Route53ResolverRuleDataSource)]
}
