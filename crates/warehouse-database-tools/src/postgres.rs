//! PostgreSQL backend

use crate::database::Database;
use crate::types::{QueryOutcome, Row, SchemaMap, SchemaOutcome, TableColumns};
use crate::value::{bytes_to_hex, unsupported};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::Uuid;
use sqlx::{Column, Connection, Executor, Postgres, Row as _, Transaction, TypeInfo, ValueRef};
use tracing::Instrument;
use warehouse_core::{DatabaseConfig, Error, Result};
use warehouse_telemetry::database_span;

const SYSTEM: &str = "postgresql";

/// Every table of the `public` schema with its columns, grouped by table
const SCHEMA_MAP_QUERY: &str = r#"
    SELECT table_name::text AS table_name,
           array_agg(column_name::text ORDER BY ordinal_position) AS columns
    FROM information_schema.columns
    WHERE table_schema = 'public'
    GROUP BY table_name
"#;

/// Columns of one table, matched by name
const TABLE_COLUMNS_QUERY: &str = r#"
    SELECT column_name::text AS column_name
    FROM information_schema.columns
    WHERE table_name::text = $1
    ORDER BY ordinal_position
"#;

/// Wrapper around a single PostgreSQL connection
pub struct PostgresDatabase {
    config: DatabaseConfig,
    connection: Option<PgConnection>,
}

impl PostgresDatabase {
    /// Creates a disconnected wrapper; call [`Database::connect`] before use
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .database(&self.config.name)
            .username(&self.config.user)
            .application_name("warehouse-database-tools");

        if self.config.password.is_empty() {
            options
        } else {
            options.password(&self.config.password)
        }
    }

    fn connection(&mut self) -> Result<&mut PgConnection> {
        self.connection.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn system(&self) -> &'static str {
        SYSTEM
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    async fn connect(&mut self) -> bool {
        let span = database_span(SYSTEM, "connect");
        async move {
            if self.connection.is_some() {
                tracing::debug!("PostgreSQL connection already open");
                return true;
            }

            let target = self.config.target();
            match PgConnection::connect_with(&self.connect_options()).await {
                Ok(conn) => {
                    tracing::info!(target_db = %target, "Connected to PostgreSQL");
                    self.connection = Some(conn);
                    true
                }
                Err(e) => {
                    tracing::error!(target_db = %target, error = %e, "Failed to connect to PostgreSQL");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn disconnect(&mut self) {
        let span = database_span(SYSTEM, "disconnect");
        async move {
            let Some(conn) = self.connection.take() else {
                return;
            };

            match conn.close().await {
                Ok(()) => tracing::info!("PostgreSQL connection closed"),
                Err(e) => tracing::warn!(error = %e, "Error while closing PostgreSQL connection"),
            }
        }
        .instrument(span)
        .await
    }

    async fn execute_query(&mut self, sql: &str) -> Result<QueryOutcome> {
        let span = database_span(SYSTEM, "execute_query");
        async move {
            let conn = self.connection()?;
            tracing::debug!(sql = %sql, "Executing PostgreSQL query");

            let mut tx = match conn.begin().await {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(error = %e, "Could not open transaction");
                    return Ok(QueryOutcome::Failed);
                }
            };

            // Simple query protocol: no prepared statement, several statements allowed,
            // every value arrives as text
            let fetched = (&mut *tx).fetch_all(sqlx::raw_sql(sql)).await;

            let rows = match fetched {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(sql = %sql, error = %e, "Error while executing query");
                    rollback(tx).await;
                    return Ok(QueryOutcome::Failed);
                }
            };

            if let Err(e) = tx.commit().await {
                tracing::error!(sql = %sql, error = %e, "Error while committing query");
                return Ok(QueryOutcome::Failed);
            }

            if rows.is_empty() {
                tracing::info!("Query returned no rows");
                return Ok(QueryOutcome::NoData);
            }

            let rows: Vec<Row> = rows.iter().map(decode_row).collect();
            tracing::info!(row_count = rows.len(), "Query returned rows");
            Ok(QueryOutcome::Rows(rows))
        }
        .instrument(span)
        .await
    }

    async fn list_tables_and_columns(&mut self) -> Result<SchemaOutcome> {
        let span = database_span(SYSTEM, "list_tables_and_columns");
        async move {
            let conn = self.connection()?;

            let mut tx = match conn.begin().await {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(error = %e, "Could not open transaction");
                    return Ok(SchemaOutcome::Error(e.to_string()));
                }
            };

            let collected = match sqlx::query(SCHEMA_MAP_QUERY).fetch_all(&mut *tx).await {
                Ok(rows) => collect_schema(&rows),
                Err(e) => Err(e),
            };

            let schema = match collected {
                Ok(schema) => schema,
                Err(e) => {
                    tracing::error!(error = %e, "Error while getting tables and columns");
                    rollback(tx).await;
                    return Ok(SchemaOutcome::Error(e.to_string()));
                }
            };

            if let Err(e) = tx.commit().await {
                tracing::error!(error = %e, "Error while committing catalog query");
                return Ok(SchemaOutcome::Error(e.to_string()));
            }

            if schema.is_empty() {
                tracing::info!("No tables found in the public schema");
                return Ok(SchemaOutcome::Empty);
            }

            tracing::info!(table_count = schema.len(), "Read database schema");
            Ok(SchemaOutcome::Tables(schema))
        }
        .instrument(span)
        .await
    }

    async fn list_columns(&mut self, table_name: &str) -> Result<TableColumns> {
        let span = database_span(SYSTEM, "list_columns");
        async move {
            let conn = self.connection()?;

            let mut tx = match conn.begin().await {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(table = %table_name, error = %e, "Could not open transaction");
                    return Ok(TableColumns::new(table_name, Vec::new()));
                }
            };

            let fetched = sqlx::query(TABLE_COLUMNS_QUERY)
                .bind(table_name)
                .fetch_all(&mut *tx)
                .await
                .and_then(|rows| {
                    rows.iter()
                        .map(|row| row.try_get::<String, _>("column_name"))
                        .collect::<std::result::Result<Vec<_>, _>>()
                });

            match fetched {
                Ok(columns) => {
                    if let Err(e) = tx.commit().await {
                        tracing::error!(table = %table_name, error = %e, "Error while committing catalog query");
                        return Ok(TableColumns::new(table_name, Vec::new()));
                    }
                    tracing::debug!(table = %table_name, column_count = columns.len(), "Read table columns");
                    Ok(TableColumns::new(table_name, columns))
                }
                Err(e) => {
                    tracing::error!(table = %table_name, error = %e, "Error while getting columns for table");
                    rollback(tx).await;
                    Ok(TableColumns::new(table_name, Vec::new()))
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl Drop for PostgresDatabase {
    fn drop(&mut self) {
        if self.connection.is_some() {
            tracing::warn!(
                target_db = %self.config.target(),
                "PostgreSQL wrapper dropped without disconnect(); the connection is closed without a graceful shutdown"
            );
        }
    }
}

async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Rollback failed");
    }
}

fn collect_schema(rows: &[PgRow]) -> std::result::Result<SchemaMap, sqlx::Error> {
    let mut schema = SchemaMap::new();
    for row in rows {
        let table: String = row.try_get("table_name")?;
        let columns: Vec<String> = row.try_get("columns")?;
        schema.insert(table, columns);
    }
    Ok(schema)
}

fn decode_row(row: &PgRow) -> Row {
    (0..row.columns().len()).map(|i| decode_value(row, i)).collect()
}

/// Converts one column value to JSON, choosing the Rust type from the column's SQL type
fn decode_value(row: &PgRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return Value::Null,
    }

    let type_name = row.column(index).type_info().name();
    let decoded = match type_name {
        "BOOL" => row.try_get::<bool, _>(index).map(Value::from),
        "INT2" => row.try_get::<i16, _>(index).map(Value::from),
        "INT4" => row.try_get::<i32, _>(index).map(Value::from),
        "INT8" => row.try_get::<i64, _>(index).map(Value::from),
        "FLOAT4" => row.try_get::<f32, _>(index).map(Value::from),
        "FLOAT8" => row.try_get::<f64, _>(index).map(Value::from),
        // Exact digits, NaN and magnitudes no fixed-width type holds
        "NUMERIC" => return text_value(row, index, type_name),
        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .map(|d| Value::String(d.to_string())),
        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .map(|t| Value::String(t.to_string())),
        "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|t| Value::String(t.to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|t| Value::String(t.to_rfc3339())),
        "UUID" => row
            .try_get::<Uuid, _>(index)
            .map(|u| Value::String(u.to_string())),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index),
        "BYTEA" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|b| bytes_to_hex(&b)),
        "TEXT[]" | "VARCHAR[]" | "NAME[]" | "BPCHAR[]" => {
            row.try_get::<Vec<String>, _>(index).map(Value::from)
        }
        "INT2[]" => row.try_get::<Vec<i16>, _>(index).map(Value::from),
        "INT4[]" => row.try_get::<Vec<i32>, _>(index).map(Value::from),
        "INT8[]" => row.try_get::<Vec<i64>, _>(index).map(Value::from),
        "FLOAT8[]" => row.try_get::<Vec<f64>, _>(index).map(Value::from),
        "BOOL[]" => row.try_get::<Vec<bool>, _>(index).map(Value::from),
        _ => row.try_get::<String, _>(index).map(Value::String),
    };

    decoded.unwrap_or_else(|_| text_value(row, index, type_name))
}

/// The value as the server printed it (INTERVAL, MONEY, INET, enums, ...)
fn text_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    let text = row
        .try_get_raw(index)
        .map_err(|e| e.to_string())
        .and_then(|raw| raw.as_str().map(str::to_string).map_err(|e| e.to_string()));

    match text {
        Ok(text) => Value::String(text),
        Err(e) => {
            tracing::debug!(column = index, sql_type = %type_name, error = %e, "Value has no JSON rendering");
            unsupported(type_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wrapper_is_disconnected() {
        let db = PostgresDatabase::new(DatabaseConfig::new("northwind", "reader"));
        assert!(!db.is_connected());
        assert_eq!(db.system(), "postgresql");
        assert_eq!(db.config().port, 5432);
    }

    #[tokio::test]
    async fn test_operations_before_connect_fail_clearly() {
        let mut db = PostgresDatabase::new(DatabaseConfig::new("northwind", "reader"));

        assert!(matches!(
            db.execute_query("SELECT 1").await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            db.list_tables_and_columns().await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            db.list_columns("products").await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_without_connection_is_noop() {
        let mut db = PostgresDatabase::new(DatabaseConfig::new("northwind", "reader"));
        db.disconnect().await;
        db.disconnect().await;
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_wrapper_disconnected() {
        // Port 1 on loopback refuses connections
        let config = DatabaseConfig::new("northwind", "reader")
            .with_host("127.0.0.1")
            .with_port(1);
        let mut db = PostgresDatabase::new(config);

        assert!(!db.connect().await);
        assert!(!db.is_connected());
        assert!(matches!(
            db.execute_query("SELECT 1").await,
            Err(Error::NotConnected)
        ));
    }
}
