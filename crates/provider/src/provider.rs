//! Stratus Provider Implementation
//!
//! Dispatches the resource lifecycle (validate, plan, apply, read, import)
//! and data source reads to the registered handlers.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use stratus_common::{error::is_not_found, Error, ProviderConfig};
use tracing::{debug, info, warn};

use crate::client::CloudClient;
use crate::data_sources::{self, DataSource};
use crate::resources::{self, Resource};
use crate::schema::{Diagnostic, PlannedChange, ResourceSchema};
use crate::state::DynamicValue;

/// Stratus provider
pub struct StratusProvider {
    config: ProviderConfig,
    client: CloudClient,
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl std::fmt::Debug for StratusProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StratusProvider")
            .field("client", &self.client)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StratusProvider {
    /// Provider serving every built-in resource and data source
    pub fn new(config: ProviderConfig, client: CloudClient) -> Self {
        let resources = resources::all()
            .into_iter()
            .map(|r| (r.type_name(), r))
            .collect();
        let data_sources = data_sources::all()
            .into_iter()
            .map(|d| (d.type_name(), d))
            .collect();
        info!(
            "Provider ready in {} ({}) for account {}",
            client.region, client.partition, client.account_id
        );
        Self {
            config,
            client,
            resources,
            data_sources,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn client(&self) -> &CloudClient {
        &self.client
    }

    /// Registered resource type names, sorted
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Registered data source type names, sorted
    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(|r| &**r)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()).into())
    }

    fn data_source(&self, type_name: &str) -> Result<&dyn DataSource> {
        self.data_sources
            .get(type_name)
            .map(|d| &**d)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()).into())
    }

    /// Schema of a resource or data source type
    pub fn schema(&self, type_name: &str) -> Result<ResourceSchema> {
        if let Some(resource) = self.resources.get(type_name) {
            return Ok(resource.schema());
        }
        Ok(self.data_source(type_name)?.schema())
    }

    /// Diagnostics for a resource configuration; empty when valid
    pub fn validate_resource_config(
        &self,
        type_name: &str,
        config: &DynamicValue,
    ) -> Result<Vec<Diagnostic>> {
        debug!("ValidateResourceConfig called for {}", type_name);
        Ok(self.resource(type_name)?.schema().validate(config))
    }

    /// Plan moving from `prior` state to the `proposed` configuration
    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior: Option<&DynamicValue>,
        proposed: &DynamicValue,
    ) -> Result<PlannedChange> {
        debug!("PlanResourceChange called for {}", type_name);
        let schema = self.resource(type_name)?.schema();
        if !proposed.is_null() {
            schema.validate_strict(proposed)?;
        }
        Ok(schema.plan(prior, proposed))
    }

    /// Apply a planned change.
    ///
    /// A null prior creates, a null plan deletes (and yields null), anything
    /// else updates in place after ForceNew attributes are checked.
    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior: Option<&DynamicValue>,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        info!("ApplyResourceChange called for {}", type_name);
        let resource = self.resource(type_name)?;
        let schema = resource.schema();
        let prior = prior.filter(|p| !p.is_null());

        match (prior, planned.is_null()) {
            (None, true) => Ok(DynamicValue::Null),
            (None, false) => {
                schema.validate_strict(planned)?;
                let config = schema.apply_defaults(planned);
                resource
                    .create(&self.client, &config)
                    .await
                    .with_context(|| format!("{}: create failed", type_name))
            }
            (Some(prior), true) => {
                resource
                    .delete(&self.client, prior)
                    .await
                    .with_context(|| format!("{}: delete failed", type_name))?;
                Ok(DynamicValue::Null)
            }
            (Some(prior), false) => {
                let mut planned = schema.apply_defaults(planned);
                schema.check_update(prior, &planned)?;
                if !planned.has("id") {
                    if let Some(id) = prior.get("id") {
                        planned.set("id", id.clone());
                    }
                }
                resource
                    .update(&self.client, prior, &planned)
                    .await
                    .with_context(|| format!("{}: update failed", type_name))
            }
        }
    }

    /// Refresh state; `None` when the remote object no longer exists
    pub async fn read_resource(
        &self,
        type_name: &str,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        info!("ReadResource called for {}", type_name);
        let resource = self.resource(type_name)?;
        if state.is_null() {
            return Ok(None);
        }
        match resource.read(&self.client, state).await {
            Ok(refreshed) => Ok(refreshed),
            Err(err) if is_not_found(&err) => {
                warn!("{} not found, removing from state: {:#}", type_name, err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Import an existing object by id
    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> Result<DynamicValue> {
        info!("ImportResourceState called for {} with ID {}", type_name, id);
        self.resource(type_name)?
            .import(&self.client, id)
            .await
            .with_context(|| format!("error importing {} ({})", type_name, id))
    }

    /// Look up a data source
    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: &DynamicValue,
    ) -> Result<DynamicValue> {
        info!("ReadDataSource called for {}", type_name);
        let data_source = self.data_source(type_name)?;
        data_source.schema().validate_strict(config)?;
        data_source.read(&self.client, config).await
    }
}
