//! CLI Commands

pub mod data;
pub mod resource;
pub mod schema;
pub mod sim;
