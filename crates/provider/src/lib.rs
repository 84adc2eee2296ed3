//! Stratus Provider
//!
//! Resource handlers implementing the create/read/update/delete/import
//! contract for a set of cloud resource types, the lifecycle poller they use
//! to wait out asynchronous state changes, and a local simulator that serves
//! the cloud APIs.

pub mod api;
pub mod client;
pub mod cloud;
pub mod data_sources;
pub mod provider;
pub mod resources;
pub mod retry;
pub mod schema;
pub mod state;
pub mod waiter;

pub use client::CloudClient;
pub use cloud::SimulatedCloud;
pub use provider::StratusProvider;
pub use state::DynamicValue;
