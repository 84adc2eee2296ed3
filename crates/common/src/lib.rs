//! Stratus Common Library
//!
//! Shared error taxonomy, configuration, identifiers and persistence for the
//! Stratus provider and its tooling.

pub mod config;
pub mod db;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{PropagationConfig, ProviderConfig, SimulatorConfig, TimeoutsConfig};
pub use db::Database;
pub use error::{ApiError, ApiErrorKind, Error, Result};
pub use types::*;

/// Stratus version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default store path
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".stratus")
}

/// Default configuration file path
pub fn default_config_path() -> std::path::PathBuf {
    default_store_path().join("config.toml")
}

/// Default simulator database path
pub fn default_db_path() -> std::path::PathBuf {
    default_store_path().join("cloud.db")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
