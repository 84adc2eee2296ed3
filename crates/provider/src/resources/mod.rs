//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type.

pub mod carrier_gateway;
pub mod dax_parameter_group;
pub mod fsx_lustre_file_system;
pub mod gamelift_alias;
pub mod securityhub_organization_configuration;
pub mod servicecatalog_constraint;
pub mod ses_active_receipt_rule_set;
pub mod ses_receipt_rule_set;
pub mod transit_gateway_peering_attachment;

use anyhow::Result;
use stratus_common::{Error, Tags};

use crate::client::CloudClient;
use crate::schema::ResourceSchema;
use crate::state::{get_string_attr, make_state, string_value, DynamicValue};

/// Trait for resource operations
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name
    fn type_name(&self) -> &'static str;

    /// Attribute declarations used for validation and planning
    fn schema(&self) -> ResourceSchema;

    /// Create a new resource
    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue>;

    /// Read an existing resource; `None` when it no longer exists
    async fn read(&self, client: &CloudClient, state: &DynamicValue)
        -> Result<Option<DynamicValue>>;

    /// Update an existing resource in place
    async fn update(
        &self,
        client: &CloudClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue>;

    /// Delete a resource
    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()>;

    fn importable(&self) -> bool {
        true
    }

    /// Import by id: read the resource as if only its id were known
    async fn import(&self, client: &CloudClient, id: &str) -> Result<DynamicValue> {
        if !self.importable() {
            return Err(Error::ImportNotSupported(self.type_name().to_string()).into());
        }
        let state = make_state(vec![("id", string_value(id))]);
        match self.read(client, &state).await? {
            Some(imported) => Ok(imported),
            None => Err(Error::not_found(self.type_name(), id).into()),
        }
    }
}

/// All resource handlers this provider serves
pub fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(carrier_gateway::CarrierGatewayResource),
        Box::new(transit_gateway_peering_attachment::TransitGatewayPeeringAttachmentResource),
        Box::new(dax_parameter_group::DaxParameterGroupResource),
        Box::new(gamelift_alias::GameLiftAliasResource),
        Box::new(ses_receipt_rule_set::SesReceiptRuleSetResource),
        Box::new(ses_active_receipt_rule_set::SesActiveReceiptRuleSetResource),
        Box::new(securityhub_organization_configuration::SecurityHubOrganizationConfigurationResource),
        Box::new(servicecatalog_constraint::ServiceCatalogConstraintResource),
        Box::new(fsx_lustre_file_system::FsxLustreFileSystemResource),
    ]
}

/// Read a resource right after writing it; it must exist
pub(crate) async fn read_back(
    resource: &dyn Resource,
    client: &CloudClient,
    id: &str,
) -> Result<DynamicValue> {
    let state = make_state(vec![("id", string_value(id))]);
    resource
        .read(client, &state)
        .await?
        .ok_or_else(|| Error::not_found(resource.type_name(), id).into())
}

/// The `id` attribute of a state value
pub(crate) fn resource_id(state: &DynamicValue) -> Result<String> {
    let id = get_string_attr(state, "id");
    if id.is_empty() {
        return Err(Error::Validation("state has no id".to_string()).into());
    }
    Ok(id)
}

/// Split a tag change into tags to set and keys to remove
pub(crate) fn tag_changes(old: &Tags, new: &Tags) -> (Tags, Vec<String>) {
    let upserts = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let removals = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .cloned()
        .collect();
    (upserts, removals)
}
