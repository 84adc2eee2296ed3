//! DAX Parameter Group resource

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{read_back, resource_id, Resource};
use crate::api::dax::{Parameter, ERR_PARAMETER_GROUP_NOT_FOUND};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema};
use crate::state::{
    get_list_attr, get_optional_string_attr, get_string_attr, list_value, make_state,
    string_value, DynamicValue,
};

pub const TYPE_NAME: &str = "aws_dax_parameter_group";

pub struct DaxParameterGroupResource;

#[async_trait::async_trait]
impl Resource for DaxParameterGroupResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .attribute(Attribute::optional("description", AttributeType::String).force_new())
            .attribute(Attribute::required("name", AttributeType::String).force_new())
            .attribute(
                Attribute::optional_computed(
                    "parameters",
                    AttributeType::Set(Box::new(AttributeType::Object(vec![
                        Attribute::required("name", AttributeType::String),
                        Attribute::required("value", AttributeType::String),
                    ]))),
                )
                .with_description("Parameter name/value pairs; unspecified parameters keep the service defaults"),
            )
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let name = get_string_attr(config, "name");
        let description = get_optional_string_attr(config, "description");

        debug!("Creating DAX Parameter Group {}", name);
        client
            .dax
            .create_parameter_group(&name, description.as_deref())
            .await
            .with_context(|| format!("error creating DAX Parameter Group ({})", name))?;
        info!("Created DAX Parameter Group {}", name);

        let parameters = expand_parameters(config);
        if !parameters.is_empty() {
            client
                .dax
                .update_parameter_group(&name, &parameters)
                .await
                .with_context(|| {
                    format!("error setting DAX Parameter Group ({}) parameters", name)
                })?;
        }

        read_back(self, client, &name).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;

        let groups = match client.dax.describe_parameter_groups(&[id.clone()]).await {
            Ok(groups) => groups,
            Err(err) if err.has_code(ERR_PARAMETER_GROUP_NOT_FOUND) => Vec::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("error reading DAX Parameter Group ({})", id))
            }
        };
        let Some(group) = groups.into_iter().next() else {
            warn!("DAX Parameter Group ({}) not found, removing from state", id);
            return Ok(None);
        };

        let mut parameters = match client.dax.describe_parameters(&id).await {
            Ok(parameters) => parameters,
            Err(err) if err.has_code(ERR_PARAMETER_GROUP_NOT_FOUND) => {
                warn!("DAX Parameter Group ({}) not found, removing from state", id);
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("error reading DAX Parameter Group ({}) parameters", id)
                })
            }
        };
        parameters.sort();

        // The service reports a single space when no description was given
        let description = if group.description == " " {
            String::new()
        } else {
            group.description
        };

        Ok(Some(make_state(vec![
            ("id", string_value(&id)),
            ("name", string_value(&group.parameter_group_name)),
            ("description", string_value(description)),
            ("parameters", flatten_parameters(&parameters)),
        ])))
    }

    async fn update(
        &self,
        client: &CloudClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = resource_id(prior)?;
        let parameters = expand_parameters(planned);

        if !parameters.is_empty() && parameters != expand_parameters(prior) {
            debug!("Updating DAX Parameter Group {} parameters", id);
            client
                .dax
                .update_parameter_group(&id, &parameters)
                .await
                .with_context(|| format!("error updating DAX Parameter Group ({})", id))?;
        }

        read_back(self, client, &id).await
    }

    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()> {
        let id = resource_id(state)?;

        info!("Deleting DAX Parameter Group ({})", id);
        match client.dax.delete_parameter_group(&id).await {
            Ok(()) => Ok(()),
            Err(err) if err.has_code(ERR_PARAMETER_GROUP_NOT_FOUND) => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("error deleting DAX Parameter Group ({})", id))
            }
        }
    }
}

/// Parameters from the `parameters` set, sorted by name
fn expand_parameters(value: &DynamicValue) -> Vec<Parameter> {
    let mut parameters: Vec<Parameter> = get_list_attr(value, "parameters")
        .iter()
        .map(|p| Parameter {
            parameter_name: get_string_attr(p, "name"),
            parameter_value: get_string_attr(p, "value"),
        })
        .filter(|p| !p.parameter_name.is_empty())
        .collect();
    parameters.sort();
    parameters
}

fn flatten_parameters(parameters: &[Parameter]) -> DynamicValue {
    list_value(
        parameters
            .iter()
            .map(|p| {
                make_state(vec![
                    ("name", string_value(&p.parameter_name)),
                    ("value", string_value(&p.parameter_value)),
                ])
            })
            .collect(),
    )
}
