//! Cloud client handed to every resource operation

use std::sync::Arc;

use stratus_common::{Arn, ProviderConfig, TimeoutsConfig};

use crate::api::{
    DaxApi, Ec2Api, FsxApi, GameLiftApi, Route53ResolverApi, SecurityHubApi, ServiceCatalogApi,
    SesApi,
};
use crate::cloud::SimulatedCloud;
use crate::retry::RetryConfig;

/// Caller identity plus one handle per cloud service.
///
/// Constructed once and passed explicitly; nothing in the provider reaches for
/// a global client.
#[derive(Clone)]
pub struct CloudClient {
    pub region: String,
    pub partition: String,
    pub account_id: String,
    /// Lifecycle wait budgets and polling cadence
    pub timeouts: TimeoutsConfig,
    /// Retry policy for propagation errors
    pub retry: RetryConfig,
    pub ec2: Arc<dyn Ec2Api>,
    pub dax: Arc<dyn DaxApi>,
    pub gamelift: Arc<dyn GameLiftApi>,
    pub ses: Arc<dyn SesApi>,
    pub securityhub: Arc<dyn SecurityHubApi>,
    pub servicecatalog: Arc<dyn ServiceCatalogApi>,
    pub fsx: Arc<dyn FsxApi>,
    pub route53resolver: Arc<dyn Route53ResolverApi>,
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("region", &self.region)
            .field("partition", &self.partition)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl CloudClient {
    /// Client whose every service is served by the local simulator
    pub fn simulated(config: &ProviderConfig, cloud: Arc<SimulatedCloud>) -> Self {
        Self {
            region: config.region.clone(),
            partition: config.partition.clone(),
            account_id: config.account_id.clone(),
            timeouts: config.timeouts.clone(),
            retry: RetryConfig::from(&config.propagation),
            ec2: cloud.clone(),
            dax: cloud.clone(),
            gamelift: cloud.clone(),
            ses: cloud.clone(),
            securityhub: cloud.clone(),
            servicecatalog: cloud.clone(),
            fsx: cloud.clone(),
            route53resolver: cloud,
        }
    }

    /// ARN in the caller's partition and region
    pub fn arn(&self, service: &str, account_id: &str, resource: impl Into<String>) -> Arn {
        Arn::new(
            self.partition.as_str(),
            service,
            self.region.as_str(),
            account_id,
            resource,
        )
    }
}
