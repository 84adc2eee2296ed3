//! FSx for Lustre File System resource
//!
//! Creation and capacity changes are asynchronous. A capacity update is
//! tracked twice: first the `FILE_SYSTEM_UPDATE` administrative action, then
//! the file system lifecycle returning to `AVAILABLE`.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{read_back, resource_id, tag_changes, Resource};
use crate::api::fsx::{
    action_status, lifecycle, CreateFileSystemInput, FileSystem, FsxApi,
    ACTION_FILE_SYSTEM_UPDATE, ERR_FILE_SYSTEM_NOT_FOUND,
};
use crate::client::CloudClient;
use crate::schema::{Attribute, AttributeType, ResourceSchema, Validator};
use crate::state::{
    get_int_attr, get_list_attr, get_string_attr, get_string_map_attr, int_value, list_value,
    make_state, string_map_value, string_value, DynamicValue,
};
use crate::waiter::{StateChangeConf, StatusField};

pub const TYPE_NAME: &str = "aws_fsx_lustre_file_system";

pub const DEPLOYMENT_TYPES: &[&str] = &["SCRATCH_1", "SCRATCH_2", "PERSISTENT_1"];
const DEFAULT_DEPLOYMENT_TYPE: &str = "SCRATCH_2";

pub struct FsxLustreFileSystemResource;

#[async_trait::async_trait]
impl Resource for FsxLustreFileSystemResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME)
            .attribute(Attribute::computed("arn", AttributeType::String))
            .attribute(
                Attribute::optional("deployment_type", AttributeType::String)
                    .force_new()
                    .with_default(string_value(DEFAULT_DEPLOYMENT_TYPE))
                    .validate(Validator::StringInSlice(DEPLOYMENT_TYPES.to_vec())),
            )
            .attribute(Attribute::computed("dns_name", AttributeType::String))
            .attribute(Attribute::computed("owner_id", AttributeType::String))
            .attribute(
                Attribute::required("storage_capacity", AttributeType::Int)
                    .with_description("Storage capacity in GiB; can only be increased"),
            )
            .attribute(
                Attribute::required(
                    "subnet_ids",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .force_new()
                .max_items(1),
            )
            .attribute(Attribute::tags())
    }

    async fn create(&self, client: &CloudClient, config: &DynamicValue) -> Result<DynamicValue> {
        let deployment_type = match get_string_attr(config, "deployment_type") {
            t if t.is_empty() => DEFAULT_DEPLOYMENT_TYPE.to_string(),
            t => t,
        };
        let input = CreateFileSystemInput {
            storage_capacity: get_int_attr(config, "storage_capacity", 0),
            subnet_ids: string_list(config, "subnet_ids"),
            deployment_type,
            tags: get_string_map_attr(config, "tags"),
        };

        debug!("Creating FSx Lustre File System: {:?}", input);
        let fs = client
            .fsx
            .create_file_system(&input)
            .await
            .context("error creating FSx Lustre File System")?;
        let id = fs.file_system_id;
        info!("Created FSx Lustre File System {}", id);

        wait_file_system_created(client, &id)
            .await
            .with_context(|| {
                format!("error waiting for FSx Lustre File System ({}) to be available", id)
            })?;

        read_back(self, client, &id).await
    }

    async fn read(
        &self,
        client: &CloudClient,
        state: &DynamicValue,
    ) -> Result<Option<DynamicValue>> {
        let id = resource_id(state)?;
        let fs = find_file_system(client.fsx.as_ref(), &id)
            .await
            .with_context(|| format!("error reading FSx Lustre File System ({})", id))?;

        let Some(fs) = fs else {
            warn!("FSx Lustre File System ({}) not found, removing from state", id);
            return Ok(None);
        };

        Ok(Some(make_state(vec![
            ("id", string_value(&fs.file_system_id)),
            ("arn", string_value(&fs.arn)),
            ("deployment_type", string_value(&fs.deployment_type)),
            ("dns_name", string_value(&fs.dns_name)),
            ("owner_id", string_value(&fs.owner_id)),
            ("storage_capacity", int_value(fs.storage_capacity)),
            (
                "subnet_ids",
                list_value(fs.subnet_ids.iter().map(string_value).collect()),
            ),
            ("tags", string_map_value(&fs.tags)),
        ])))
    }

    async fn update(
        &self,
        client: &CloudClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = resource_id(prior)?;

        let (upserts, removals) = tag_changes(
            &get_string_map_attr(prior, "tags"),
            &get_string_map_attr(planned, "tags"),
        );
        if !upserts.is_empty() || !removals.is_empty() {
            let arn = get_string_attr(prior, "arn");
            let context = || format!("error updating FSx Lustre File System ({}) tags", id);
            if !removals.is_empty() {
                client
                    .fsx
                    .untag_resource(&arn, &removals)
                    .await
                    .with_context(context)?;
            }
            if !upserts.is_empty() {
                client
                    .fsx
                    .tag_resource(&arn, &upserts)
                    .await
                    .with_context(context)?;
            }
        }

        let capacity = get_int_attr(planned, "storage_capacity", 0);
        if capacity != get_int_attr(prior, "storage_capacity", 0) {
            info!(
                "Updating FSx Lustre File System {} storage capacity to {} GiB",
                id, capacity
            );
            client
                .fsx
                .update_file_system(&id, capacity)
                .await
                .with_context(|| format!("error updating FSx Lustre File System ({})", id))?;

            wait_administrative_action(client, &id, ACTION_FILE_SYSTEM_UPDATE)
                .await
                .with_context(|| {
                    format!(
                        "error waiting for FSx Lustre File System ({}) administrative action ({}) to complete",
                        id, ACTION_FILE_SYSTEM_UPDATE
                    )
                })?;
            wait_file_system_updated(client, &id)
                .await
                .with_context(|| {
                    format!("error waiting for FSx Lustre File System ({}) update", id)
                })?;
        }

        read_back(self, client, &id).await
    }

    async fn delete(&self, client: &CloudClient, state: &DynamicValue) -> Result<()> {
        let id = resource_id(state)?;

        info!("Deleting FSx Lustre File System ({})", id);
        if let Err(err) = client.fsx.delete_file_system(&id).await {
            if err.has_code(ERR_FILE_SYSTEM_NOT_FOUND) {
                return Ok(());
            }
            return Err(err)
                .with_context(|| format!("error deleting FSx Lustre File System ({})", id));
        }

        wait_file_system_deleted(client, &id)
            .await
            .with_context(|| {
                format!("error waiting for FSx Lustre File System ({}) to be deleted", id)
            })?;
        Ok(())
    }
}

fn string_list(value: &DynamicValue, key: &str) -> Vec<String> {
    get_list_attr(value, key)
        .iter()
        .filter_map(|v| v.as_string().map(str::to_string))
        .collect()
}

async fn find_file_system(
    api: &dyn FsxApi,
    id: &str,
) -> stratus_common::Result<Option<FileSystem>> {
    match api.describe_file_systems(&[id.to_string()]).await {
        Ok(found) => Ok(found.into_iter().find(|fs| fs.file_system_id == id)),
        Err(err) if err.has_code(ERR_FILE_SYSTEM_NOT_FOUND) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn status_file_system(
    api: &dyn FsxApi,
    id: &str,
    field: &StatusField,
) -> stratus_common::Result<Option<(FileSystem, String)>> {
    Ok(find_file_system(api, id).await?.map(|fs| {
        let status = field.extract(&fs);
        (fs, status)
    }))
}

fn lifecycle_wait(pending: &[&str], target: &[&str], timeout: std::time::Duration) -> StateChangeConf<FileSystem> {
    StateChangeConf::new(pending, target, timeout)
        .failure_detail(|fs: &FileSystem| fs.failure_details.clone())
}

async fn wait_file_system_created(
    client: &CloudClient,
    id: &str,
) -> stratus_common::Result<Option<FileSystem>> {
    let api = client.fsx.as_ref();
    let field = &StatusField::Lifecycle;
    lifecycle_wait(&[lifecycle::CREATING], &[lifecycle::AVAILABLE], client.timeouts.create())
        .with_timing(&client.timeouts)
        .wait(move || status_file_system(api, id, field))
        .await
}

async fn wait_file_system_updated(
    client: &CloudClient,
    id: &str,
) -> stratus_common::Result<Option<FileSystem>> {
    let api = client.fsx.as_ref();
    let field = &StatusField::Lifecycle;
    lifecycle_wait(&[lifecycle::UPDATING], &[lifecycle::AVAILABLE], client.timeouts.update())
        .with_timing(&client.timeouts)
        .wait(move || status_file_system(api, id, field))
        .await
}

async fn wait_file_system_deleted(
    client: &CloudClient,
    id: &str,
) -> stratus_common::Result<Option<FileSystem>> {
    let api = client.fsx.as_ref();
    let field = &StatusField::Lifecycle;
    lifecycle_wait(
        &[lifecycle::AVAILABLE, lifecycle::DELETING],
        &[],
        client.timeouts.delete(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_file_system(api, id, field))
    .await
}

/// An action the file system no longer lists has completed
async fn wait_administrative_action(
    client: &CloudClient,
    id: &str,
    action: &str,
) -> stratus_common::Result<Option<FileSystem>> {
    let api = client.fsx.as_ref();
    let field = &StatusField::action(action, action_status::COMPLETED);
    StateChangeConf::new(
        &[action_status::IN_PROGRESS, action_status::PENDING],
        &[action_status::COMPLETED, action_status::UPDATED_OPTIMIZING],
        client.timeouts.update(),
    )
    .with_timing(&client.timeouts)
    .wait(move || status_file_system(api, id, field))
    .await
}
