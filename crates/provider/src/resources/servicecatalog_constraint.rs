//! Service Catalog Constraint resource

use anyhow::{Context, Result};
use stratus_common::Error;
use tracing::{debug, info, warn};

use super::{resource_id, Resource};
use crate::api::servicecatalog::{
    status, CreateConstraintInput, DescribeConstraintOutput, ServiceCatalogApi,
    UpdateConstraintInput, ACCEPT_LANGUAGES, ACCEPT_LANGUAGE_ENGLISH, CONSTRAINT_TYPES,
    ERR_INVALID_PARAMETERS, ERR_RESOURCE_NOT_FOUND,
};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema, Validator};
use crate::state::{
    get_optional_string_attr, get_string_attr, make_state, string_value, DynamicValue,
};
use crate::waiter::StateChangeConf;

pub const TYPE_NAME: &str = "aws_servicecatalog_constraint";

/// Launch roles are often created alongside the constraint and take a moment
/// to become visible to Service Catalog
fn is_role_propagation(err: &Error) -> bool {
    err.api_error()
        .map(|e| e.message_contains(ERR_INVALID_PARAMETERS, "profile does not exist"))
        .unwrap_or(false)
}

pub struct ServiceCatalogConstraintResource;

impl ServiceCatalogConstraintResource {
    /// Wait for the constraint to become available and flatten it.
    ///
    /// A constraint that was just created may not be visible yet; that is an
    /// error rather than a reason to forget it.
    async fn read_constraint(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
        is_new: bool,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;
        let accept_language = accept_language(state);

        let output = match wait_constraint_ready(client, &accept_language, &id).await {
            Ok(output) => output,
            Err(err) if !is_new && err.is_not_found() => {
                warn!(
                    "Service Catalog Constraint ({}) not found, removing from state",
                    id
                );
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("error describing Service Catalog Constraint ({})", id)
                })
            }
        };
        let output = output.ok_or_else(|| {
            Error::EmptyResult(format!("Service Catalog Constraint ({})", id))
        })?;

        let detail = output.constraint_detail;
        Ok(Some(make_state(vec![
            ("id", string_value(&id)),
            ("accept_language", string_value(accept_language)),
            ("description", string_value(detail.description)),
            ("owner", string_value(detail.owner)),
            ("parameters", string_value(output.constraint_parameters)),
            ("portfolio_id", string_value(detail.portfolio_id)),
            ("product_id", string_value(detail.product_id)),
            ("status", string_value(output.status)),
            ("type", string_value(detail.constraint_type)),
        ])))
    }
}

#[async_trait::async_trait]
impl Resource for ServiceCatalogConstraintResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .with_description("Constraint applied to a product within a portfolio")
            .attribute(
                Attribute::optional("accept_language", AttributeType::String)
                    .with_default(string_value(ACCEPT_LANGUAGE_ENGLISH))
                    .validate(Validator::StringInSlice(ACCEPT_LANGUAGES.to_vec())),
            )
            .attribute(Attribute::optional_computed("description", AttributeType::String))
            .attribute(Attribute::computed("owner", AttributeType::String))
            .attribute(
                Attribute::required("parameters", AttributeType::String)
                    .validate(Validator::StringIsJson)
                    .equivalent_json(),
            )
            .attribute(Attribute::required("portfolio_id", AttributeType::String).force_new())
            .attribute(Attribute::required("product_id", AttributeType::String).force_new())
            .attribute(Attribute::computed("status", AttributeType::String))
            .attribute(
                Attribute::required("type", AttributeType::String)
                    .force_new()
                    .validate(Validator::StringInSlice(CONSTRAINT_TYPES.to_vec())),
            )
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let input = CreateConstraintInput {
            accept_language: get_optional_string_attr(config, "accept_language"),
            description: get_optional_string_attr(config, "description"),
            idempotency_token: uuid::Uuid::new_v4().to_string(),
            parameters: get_string_attr(config, "parameters"),
            portfolio_id: get_string_attr(config, "portfolio_id"),
            product_id: get_string_attr(config, "product_id"),
            constraint_type: get_string_attr(config, "type"),
        };

        debug!("Creating Service Catalog Constraint: {:?}", input);
        let api = client.servicecatalog.as_ref();
        let input = &input;
        let output = client
            .retry
            .run(
                move || api.create_constraint(input),
                |err| is_role_propagation(err) || err.has_code(ERR_RESOURCE_NOT_FOUND),
            )
            .await
            .context("error creating Service Catalog Constraint")?;

        let id = output.constraint_detail.constraint_id;
        if id.is_empty() {
            return Err(Error::EmptyResult("creating Service Catalog Constraint".to_string()).into());
        }
        info!("Created Service Catalog Constraint {}", id);

        let mut state = config.clone();
        state.set("id", string_value(&id));
        self.read_constraint(client, &state, true)
            .await?
            .ok_or_else(|| Error::not_found(TYPE_NAME, id).into())
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        self.read_constraint(client, state, false).await
    }

    async fn update(
        &self,
        client: &CloudClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = resource_id(prior)?;
        let schema = self.schema();
        let changed = |name: &str| {
            schema
                .get(name)
                .map(|attr| !attr.values_equal(prior.get(name), planned.get(name)))
                .unwrap_or(false)
        };

        let mut input = UpdateConstraintInput {
            id: id.clone(),
            ..Default::default()
        };
        if changed("accept_language") {
            input.accept_language = Some(accept_language(planned));
        }
        if changed("description") {
            input.description = Some(get_string_attr(planned, "description"));
        }
        if changed("parameters") {
            input.parameters = Some(get_string_attr(planned, "parameters"));
        }

        debug!("Updating Service Catalog Constraint: {:?}", input);
        let api = client.servicecatalog.as_ref();
        let input = &input;
        client
            .retry
            .run(move || api.update_constraint(input), is_role_propagation)
            .await
            .with_context(|| format!("error updating Service Catalog Constraint ({})", id))?;

        let mut state = planned.clone();
        state.set("id", string_value(&id));
        self.read_constraint(client, &state, false)
            .await?
            .ok_or_else(|| Error::not_found(TYPE_NAME, id).into())
    }

    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()> {
        let id = resource_id(state)?;
        let accept_language = accept_language(state);

        info!("Deleting Service Catalog Constraint ({})", id);
        if let Err(err) = client
            .servicecatalog
            .delete_constraint(&accept_language, &id)
            .await
        {
            if err.has_code(ERR_RESOURCE_NOT_FOUND) {
                return Ok(());
            }
            return Err(err)
                .with_context(|| format!("error deleting Service Catalog Constraint ({})", id));
        }

        match wait_constraint_deleted(client, &accept_language, &id).await {
            Err(err) if !err.is_not_found() => Err(err).with_context(|| {
                format!(
                    "error waiting for Service Catalog Constraint ({}) to be deleted",
                    id
                )
            }),
            _ => Ok(()),
        }
    }
}

fn accept_language(value: &DynamicValue) -> String {
    get_optional_string_attr(value, "accept_language")
        .unwrap_or_else(|| ACCEPT_LANGUAGE_ENGLISH.to_string())
}

async fn status_constraint(
    api: &dyn ServiceCatalogApi,
    accept_language: &str,
    id: &str,
) -> stratus_common::Result<Option<(DescribeConstraintOutput, String)>> {
    match api.describe_constraint(accept_language, id).await {
        Ok(output) => {
            let status = output.status.clone();
            Ok(Some((output, status)))
        }
        Err(err) if err.has_code(ERR_RESOURCE_NOT_FOUND) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn wait_constraint_ready(
    client: &CloudClient,
    accept_language: &str,
    id: &str,
) -> stratus_common::Result<Option<DescribeConstraintOutput>> {
    let api = client.servicecatalog.as_ref();
    StateChangeConf::new(
        &[status::CREATING],
        &[status::AVAILABLE],
        client.timeouts.create(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_constraint(api, accept_language, id))
    .await
}

async fn wait_constraint_deleted(
    client: &CloudClient,
    accept_language: &str,
    id: &str,
) -> stratus_common::Result<Option<DescribeConstraintOutput>> {
    let api = client.servicecatalog.as_ref();
    StateChangeConf::new(
        &[status::AVAILABLE, status::CREATING],
        &[],
        client.timeouts.delete(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_constraint(api, accept_language, id))
    .await
}
