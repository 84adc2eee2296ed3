//! Provider session
//!
//! Wires a provider to the simulator database under the configured store
//! path, and reads and writes the JSON state files the commands exchange.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use stratus_common::{Database, ProviderConfig};
use stratus_provider::state::{decode_dynamic_value, encode_dynamic_value};
use stratus_provider::{CloudClient, DynamicValue, SimulatedCloud, StratusProvider};
use tracing::debug;

/// Provider backed by the local simulator
pub struct Session {
    pub cloud: Arc<SimulatedCloud>,
    pub provider: StratusProvider,
}

impl Session {
    pub fn open(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let db_path = config.db_path();
        debug!("Opening simulator database at {}", db_path.display());
        let db = Database::open(&db_path)
            .with_context(|| format!("failed to open simulator database {}", db_path.display()))?;

        let cloud = Arc::new(SimulatedCloud::new(db, &config));
        let client = CloudClient::simulated(&config, cloud.clone());
        Ok(Self {
            cloud,
            provider: StratusProvider::new(config, client),
        })
    }
}

/// Read a configuration or state document; a missing file is null
pub fn read_value(path: &Path) -> Result<DynamicValue> {
    if !path.exists() {
        return Ok(DynamicValue::Null);
    }
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_dynamic_value(&data).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Persist a state document; a null state removes the file
pub fn write_state(path: &Path, state: &DynamicValue) -> Result<()> {
    if state.is_null() {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, encode_dynamic_value(state)?)
        .with_context(|| format!("failed to write {}", path.display()))
}
