//! Core traits and types for the warehouse toolkit
//!
//! This crate provides the error taxonomy, configuration loading and the
//! tool abstractions shared by the database tools and their callers.

pub mod config;
pub mod context;
pub mod error;
pub mod traits;

// Re-exports
pub use config::{DatabaseConfig, LoggingConfig, SchemaFormat, ToolsConfig, WarehouseConfig};
pub use context::ToolContext;
pub use error::{Error, Result};
pub use traits::{Tool, ToolResponse};
