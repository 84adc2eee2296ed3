//! FSx: Lustre file systems

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{Result, Tags};

use crate::waiter::StatusSource;

pub const ERR_FILE_SYSTEM_NOT_FOUND: &str = "FileSystemNotFound";
pub const ERR_BAD_REQUEST: &str = "BadRequest";

/// Smallest Lustre capacity in GiB
pub const MIN_STORAGE_CAPACITY: i64 = 1200;

pub mod lifecycle {
    pub const AVAILABLE: &str = "AVAILABLE";
    pub const CREATING: &str = "CREATING";
    pub const FAILED: &str = "FAILED";
    pub const DELETING: &str = "DELETING";
    pub const UPDATING: &str = "UPDATING";
}

pub mod action_status {
    pub const IN_PROGRESS: &str = "IN_PROGRESS";
    pub const PENDING: &str = "PENDING";
    pub const COMPLETED: &str = "COMPLETED";
    pub const UPDATED_OPTIMIZING: &str = "UPDATED_OPTIMIZING";
}

pub const ACTION_FILE_SYSTEM_UPDATE: &str = "FILE_SYSTEM_UPDATE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdministrativeAction {
    pub administrative_action_type: String,
    pub status: String,
    pub target_storage_capacity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystem {
    pub file_system_id: String,
    pub arn: String,
    pub owner_id: String,
    pub dns_name: String,
    pub lifecycle: String,
    pub storage_capacity: i64,
    pub subnet_ids: Vec<String>,
    pub deployment_type: String,
    #[serde(default)]
    pub administrative_actions: Vec<AdministrativeAction>,
    pub failure_details: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

impl StatusSource for FileSystem {
    fn lifecycle(&self) -> &str {
        &self.lifecycle
    }

    fn action_status(&self, action: &str) -> Option<&str> {
        self.administrative_actions
            .iter()
            .find(|a| a.administrative_action_type == action)
            .map(|a| a.status.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFileSystemInput {
    pub storage_capacity: i64,
    pub subnet_ids: Vec<String>,
    pub deployment_type: String,
    pub tags: Tags,
}

#[async_trait]
pub trait FsxApi: Send + Sync {
    async fn create_file_system(&self, input: &CreateFileSystemInput) -> Result<FileSystem>;

    /// Unknown ids fail with [`ERR_FILE_SYSTEM_NOT_FOUND`]
    async fn describe_file_systems(&self, ids: &[String]) -> Result<Vec<FileSystem>>;

    async fn update_file_system(&self, id: &str, storage_capacity: i64) -> Result<FileSystem>;

    async fn delete_file_system(&self, id: &str) -> Result<()>;

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()>;

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> Result<()>;
}
