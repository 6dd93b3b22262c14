//! The database wrapper interface shared by all backends

use crate::types::{QueryOutcome, SchemaOutcome, TableColumns};
use async_trait::async_trait;
use warehouse_core::Result;

/// A single owned connection with query execution and schema discovery.
///
/// Database failures never surface as `Err`: they are logged and turned
/// into outcome values. The only error is [`warehouse_core::Error::NotConnected`],
/// returned when an operation runs before a successful [`Database::connect`].
#[async_trait]
pub trait Database: Send {
    /// Backend name used in logs and spans (`postgresql`, `sqlite`)
    fn system(&self) -> &'static str;

    fn is_connected(&self) -> bool;

    /// Opens the connection. A failure is logged and leaves the wrapper
    /// disconnected; returns whether a connection is open afterwards.
    async fn connect(&mut self) -> bool;

    /// Closes the connection if one is open. Safe to call repeatedly.
    async fn disconnect(&mut self);

    /// Runs `sql` verbatim in its own transaction and fetches every row.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryOutcome>;

    /// All user tables of the default schema with their column names
    async fn list_tables_and_columns(&mut self) -> Result<SchemaOutcome>;

    /// Column names of `table_name`, in catalog order
    async fn list_columns(&mut self, table_name: &str) -> Result<TableColumns>;
}
