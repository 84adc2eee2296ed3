use async_trait::async_trait;
use stratus_common::{ApiError, Error, Result, Tags};

use super::{kind, new_id, SimulatedCloud};
use crate::api::fsx::*;

fn file_system_not_found(id: &str) -> Error {
    ApiError::not_found(
        ERR_FILE_SYSTEM_NOT_FOUND,
        format!("File system '{}' does not exist.", id),
    )
    .into()
}

impl SimulatedCloud {
    fn file_system(&self, id: &str) -> Result<Option<FileSystem>> {
        let Some(row) = self.observe::<FileSystem>(kind::FSX_FILE_SYSTEM, id)? else {
            return Ok(None);
        };
        let mut fs = row.body;
        fs.lifecycle = row.status;

        // Administrative actions complete once the lifecycle settles
        if fs.lifecycle == lifecycle::AVAILABLE {
            let mut changed = false;
            for action in fs
                .administrative_actions
                .iter_mut()
                .filter(|a| a.status == action_status::IN_PROGRESS)
            {
                action.status = action_status::COMPLETED.to_string();
                if let Some(capacity) = action.target_storage_capacity {
                    fs.storage_capacity = capacity;
                }
                changed = true;
            }
            if changed {
                self.db.update(kind::FSX_FILE_SYSTEM, id, &fs)?;
            }
        }
        Ok(Some(fs))
    }

    fn file_system_by_arn(&self, arn: &str) -> Result<FileSystem> {
        let id = arn.rsplit_once("file-system/").map(|(_, id)| id).unwrap_or(arn);
        self.db
            .get::<FileSystem>(kind::FSX_FILE_SYSTEM, id)?
            .map(|row| row.body)
            .ok_or_else(|| file_system_not_found(id))
    }
}

#[async_trait]
impl FsxApi for SimulatedCloud {
    async fn create_file_system(&self, input: &CreateFileSystemInput) -> Result<FileSystem> {
        self.enter("CreateFileSystem")?;
        if input.subnet_ids.is_empty() {
            return Err(ApiError::validation(ERR_BAD_REQUEST, "At least one subnet is required").into());
        }

        let id = new_id("fs");
        // Capacity problems surface asynchronously through the lifecycle
        let (target, failure_details) = if input.storage_capacity < MIN_STORAGE_CAPACITY {
            (
                lifecycle::FAILED,
                Some(format!(
                    "Storage capacity {} GiB is below the minimum of {} GiB for Lustre file systems",
                    input.storage_capacity, MIN_STORAGE_CAPACITY
                )),
            )
        } else {
            (lifecycle::AVAILABLE, None)
        };

        let fs = FileSystem {
            arn: self.arn("fsx", format!("file-system/{}", id)),
            dns_name: format!("{}.fsx.{}.amazonaws.com", id, self.region),
            file_system_id: id,
            owner_id: self.account_id.clone(),
            lifecycle: lifecycle::CREATING.to_string(),
            storage_capacity: input.storage_capacity,
            subnet_ids: input.subnet_ids.clone(),
            deployment_type: input.deployment_type.clone(),
            administrative_actions: Vec::new(),
            failure_details,
            tags: input.tags.clone(),
        };
        self.db.insert(
            kind::FSX_FILE_SYSTEM,
            &fs.file_system_id,
            "",
            &fs,
            &fs.lifecycle,
            Some(&self.settling(target)),
        )?;
        Ok(fs)
    }

    async fn describe_file_systems(&self, ids: &[String]) -> Result<Vec<FileSystem>> {
        self.enter("DescribeFileSystems")?;
        ids.iter()
            .map(|id| self.file_system(id)?.ok_or_else(|| file_system_not_found(id)))
            .collect()
    }

    async fn update_file_system(&self, id: &str, storage_capacity: i64) -> Result<FileSystem> {
        self.enter("UpdateFileSystem")?;
        let row = self
            .db
            .get::<FileSystem>(kind::FSX_FILE_SYSTEM, id)?
            .ok_or_else(|| file_system_not_found(id))?;

        if row.status != lifecycle::AVAILABLE {
            return Err(ApiError::conflict(
                ERR_BAD_REQUEST,
                format!("File system {} is {} and cannot be updated", id, row.status),
            )
            .into());
        }
        let mut fs = row.body;
        if storage_capacity <= fs.storage_capacity {
            return Err(ApiError::validation(
                ERR_BAD_REQUEST,
                "Storage capacity can only be increased",
            )
            .into());
        }

        fs.administrative_actions.retain(|a| {
            a.administrative_action_type != ACTION_FILE_SYSTEM_UPDATE
        });
        fs.administrative_actions.push(AdministrativeAction {
            administrative_action_type: ACTION_FILE_SYSTEM_UPDATE.to_string(),
            status: action_status::IN_PROGRESS.to_string(),
            target_storage_capacity: Some(storage_capacity),
        });
        fs.lifecycle = lifecycle::UPDATING.to_string();
        self.db.update(kind::FSX_FILE_SYSTEM, id, &fs)?;
        self.db.set_status(
            kind::FSX_FILE_SYSTEM,
            id,
            lifecycle::UPDATING,
            Some(&self.settling(lifecycle::AVAILABLE)),
        )?;
        Ok(fs)
    }

    async fn delete_file_system(&self, id: &str) -> Result<()> {
        self.enter("DeleteFileSystem")?;
        if !self.db.exists(kind::FSX_FILE_SYSTEM, id)? {
            return Err(file_system_not_found(id));
        }
        self.db.set_status(
            kind::FSX_FILE_SYSTEM,
            id,
            lifecycle::DELETING,
            Some(&self.vanishing(lifecycle::DELETING)),
        )?;
        Ok(())
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()> {
        self.enter("TagResource")?;
        let mut fs = self.file_system_by_arn(arn)?;
        fs.tags
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.db.update(kind::FSX_FILE_SYSTEM, &fs.file_system_id, &fs)?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> Result<()> {
        self.enter("UntagResource")?;
        let mut fs = self.file_system_by_arn(arn)?;
        for key in keys {
            fs.tags.remove(key);
        }
        self.db.update(kind::FSX_FILE_SYSTEM, &fs.file_system_id, &fs)?;
        Ok(())
    }
}
