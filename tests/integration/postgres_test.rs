//! PostgreSQL integration tests.
//!
//! Skipped unless DATABASE_URL points at a PostgreSQL server. The tests only
//! read; they never create or drop tables in the target database.

use std::sync::Arc;

use askdb::config::ConnectionConfig;
use askdb::db::{DatabaseBackend, DatabaseClient, PostgresClient, Value};
use askdb::llm::CannedSqlGenerator;
use askdb::pipeline::{Pipeline, PipelineOptions};

/// Helper to create a test client.
async fn get_test_client() -> Option<Arc<PostgresClient>> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    if config.backend != DatabaseBackend::Postgres {
        return None;
    }
    PostgresClient::connect(&config).await.ok().map(Arc::new)
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let generator = CannedSqlGenerator::with_sql("SELECT 1 AS num, NULL::text AS nothing");
    let pipeline = Pipeline::new(client.clone(), Box::new(generator), PipelineOptions::default());

    let state = pipeline.run_query_state("one").await;

    assert_eq!(state.error_message(), None);
    assert!(state
        .formatted_output()
        .contains("Query Results:\nnum\tnothing\n1\tNULL\n"));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_timestamps_and_averages_are_not_null() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let generator = CannedSqlGenerator::with_sql(
        "WITH users (id, age, created_at) AS ( \
             VALUES (1, 28, TIMESTAMP '2024-01-15 10:30:00'), \
                    (2, 35, TIMESTAMP '2024-02-01 08:00:00') \
         ) \
         SELECT id, created_at, AVG(age) OVER () AS avg_age, CURRENT_DATE AS today \
         FROM users ORDER BY id",
    );
    let pipeline = Pipeline::new(client.clone(), Box::new(generator), PipelineOptions::default());

    let state = pipeline.run_query_state("When did users sign up?").await;

    assert_eq!(state.error_message(), None);
    let records = state.records();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].get("created_at"),
        Some(&Value::from("2024-01-15 10:30:00"))
    );
    let Some(Value::String(avg_age)) = records[1].get("avg_age") else {
        panic!("Expected avg_age as text, got {:?}", records[1].get("avg_age"));
    };
    assert!(avg_age.starts_with("31.5"));
    assert!(matches!(records[0].get("today"), Some(Value::String(_))));
    assert!(!state.formatted_output().contains("NULL"));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_public_tables_have_columns() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    for table in client.list_tables().await.unwrap() {
        let columns = client.list_columns(&table).await.unwrap();
        assert!(!columns.is_empty(), "table {table} has no columns");
    }

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_unsafe_statement_never_reaches_server() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let generator = CannedSqlGenerator::with_sql("DROP TABLE askdb_canary");
    let pipeline = Pipeline::new(client.clone(), Box::new(generator), PipelineOptions::default());

    let output = pipeline.run_query("drop it").await;

    assert!(output.contains("Only SELECT queries are allowed by default"));
    // The server would have said the table does not exist.
    assert!(!output.contains("askdb_canary"));

    let result = client.execute_query("SELECT 1").await.unwrap();
    assert_eq!(result.rows[0][0], Value::Int(1));

    client.close().await.unwrap();
}
