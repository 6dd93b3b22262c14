//! PostgreSQL integration tests.
//!
//! Require a reachable server described by the `WAREHOUSE_DB_*` variables.
//! Run with: cargo test --test postgres_integration_test -- --ignored

use serde_json::json;
use warehouse_core::WarehouseConfig;
use warehouse_database_tools::{Database, PostgresDatabase, QueryOutcome};

async fn connected() -> PostgresDatabase {
    init_test_logging();
    let config = WarehouseConfig::from_env().expect("WAREHOUSE_DB_* must be set");
    let mut db = PostgresDatabase::new(config.database);
    assert!(db.connect().await, "PostgreSQL must be reachable");
    db
}

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
#[ignore] // Needs a PostgreSQL server
async fn test_postgres_query_and_catalog() {
    let mut db = connected().await;

    for sql in [
        "DROP TABLE IF EXISTS wh_it_orders",
        "DROP TABLE IF EXISTS wh_it_products",
        "CREATE TABLE wh_it_products (id INT PRIMARY KEY, name TEXT, stock INT)",
        "CREATE TABLE wh_it_orders (id INT PRIMARY KEY, product_id INT, qty INT)",
        "INSERT INTO wh_it_products VALUES (1, 'Chai', 39)",
    ] {
        assert_eq!(db.execute_query(sql).await.unwrap(), QueryOutcome::NoData);
    }

    assert_eq!(
        db.execute_query("SELECT id, name, stock FROM wh_it_products")
            .await
            .unwrap(),
        QueryOutcome::Rows(vec![vec![json!(1), json!("Chai"), json!(39)]])
    );

    assert_eq!(
        db.execute_query("SELECT * FROM wh_it_missing").await.unwrap(),
        QueryOutcome::Failed
    );
    // Still usable after the rollback
    assert_eq!(
        db.execute_query("SELECT COUNT(*) FROM wh_it_products")
            .await
            .unwrap(),
        QueryOutcome::Rows(vec![vec![json!(1)]])
    );

    let schema = db.list_tables_and_columns().await.unwrap();
    let schema = schema.tables().expect("public schema has tables");
    assert_eq!(schema.get("wh_it_products").unwrap(), ["id", "name", "stock"]);
    assert_eq!(schema.get("wh_it_orders").unwrap(), ["id", "product_id", "qty"]);

    let columns = db.list_columns("wh_it_orders").await.unwrap();
    assert_eq!(columns.columns, vec!["id", "product_id", "qty"]);
    assert!(db.list_columns("wh_it_nope").await.unwrap().is_empty());

    db.execute_query("DROP TABLE wh_it_orders").await.unwrap();
    db.execute_query("DROP TABLE wh_it_products").await.unwrap();
    db.disconnect().await;
    db.disconnect().await;
}

#[tokio::test]
#[ignore] // Needs a PostgreSQL server
async fn test_postgres_values_without_typed_decoding() {
    let mut db = connected().await;

    let outcome = db
        .execute_query(
            "SELECT interval '3 days', inet '10.0.0.1', 'x'::\"char\", \
             1e40::numeric, 'NaN'::numeric, 12.50::numeric, 42::oid",
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Rows(vec![vec![
            json!("3 days"),
            json!("10.0.0.1"),
            json!("x"),
            json!("10000000000000000000000000000000000000000"),
            json!("NaN"),
            json!("12.50"),
            json!("42"),
        ]])
    );

    db.disconnect().await;
}

#[tokio::test]
#[ignore] // Needs a PostgreSQL server
async fn test_postgres_several_statements_in_one_call() {
    let mut db = connected().await;

    assert_eq!(
        db.execute_query("SELECT 1; SELECT 2").await.unwrap(),
        QueryOutcome::Rows(vec![vec![json!(1)], vec![json!(2)]])
    );

    db.disconnect().await;
}
