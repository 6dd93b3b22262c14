//! Database tools for warehouse agents
//!
//! This crate wraps one relational database connection (PostgreSQL or
//! SQLite) behind the [`Database`] trait, renders its schema for agents and
//! exposes both as agent tools.
//!
//! Database failures are logged and returned as outcome values
//! ([`QueryOutcome`], [`SchemaOutcome`]) rather than errors, so a bad
//! statement from an agent never tears down the tool call.

pub mod database;
pub mod formatter;
pub mod postgres;
pub mod sqlite;
pub mod tools;
pub mod types;
mod value;

// Re-exports
pub use database::Database;
pub use formatter::{format_json, format_markdown, format_schema, format_value};
pub use postgres::PostgresDatabase;
pub use sqlite::SqliteDatabase;
pub use tools::{SharedDatabase, WarehouseToolset};
pub use types::{
    NO_DATA_MESSAGE, NO_TABLES_MESSAGE, QUERY_FAILED_MESSAGE, QueryOutcome, Row, SchemaMap,
    SchemaOutcome, TableColumns,
};
