//! End-to-end pipeline tests against in-memory SQLite.

use std::sync::Arc;

use askdb::db::{DatabaseClient, Value};
use askdb::llm::{CannedSqlGenerator, FailingLlmClient, LlmSqlGenerator, MockLlmClient, SqlGenerator};
use askdb::pipeline::{Pipeline, PipelineOptions, Stage};
use pretty_assertions::assert_eq;

use super::{memory_client, sample_client};

fn mock_generator(client: MockLlmClient) -> Box<dyn SqlGenerator> {
    Box::new(LlmSqlGenerator::new(Box::new(client)))
}

async fn count_rows(client: &dyn DatabaseClient, table: &str) -> i64 {
    let result = client
        .execute_query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .await
        .unwrap();
    match result.rows[0][0] {
        Value::Int(n) => n,
        ref other => panic!("Expected Int count, got {:?}", other),
    }
}

#[tokio::test]
async fn test_show_all_users_two_rows() {
    let client = memory_client().await;
    client
        .execute_script(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO users (id, name) VALUES (1, 'Alice'), (2, 'Bob');",
        )
        .await
        .unwrap();

    let llm = MockLlmClient::new().with_response("show all users", "```sql\nSELECT * FROM users\n```");
    let pipeline = Pipeline::new(client, mock_generator(llm), PipelineOptions::default());

    let state = pipeline.run_query_state("Show all users").await;

    assert_eq!(state.stage(), Stage::Formatted);
    assert_eq!(state.sql(), "SELECT * FROM users");
    assert_eq!(state.records().len(), 2);
    assert_eq!(state.error_message(), None);
    assert_eq!(
        state.formatted_output(),
        "\nUser Question:\nShow all users\n\nGenerated SQL:\nSELECT * FROM users\n\nQuery Results:\nid\tname\n1\tAlice\n2\tBob\n"
    );
}

#[tokio::test]
async fn test_schema_snapshot_of_sample_database() {
    let client = sample_client().await;
    let pipeline = Pipeline::new(
        client,
        Box::new(CannedSqlGenerator::new()),
        PipelineOptions::default(),
    );

    let state = pipeline.run_query_state("anything").await;
    let schema = state.schema_text();

    let orders = schema.find("\nTable: orders\n").unwrap();
    let products = schema.find("\nTable: products\n").unwrap();
    let users = schema.find("\nTable: users\n").unwrap();
    assert!(orders < products && products < users);
    assert!(schema.contains("  - email: VARCHAR(100) NOT NULL"));
    assert!(schema.contains("  - age: INTEGER\n"));
    assert!(schema.contains("  - price: DOUBLE PRECISION NOT NULL"));
}

#[tokio::test]
async fn test_canned_generator_against_sample_data() {
    let client = sample_client().await;
    let pipeline = Pipeline::new(
        client,
        Box::new(CannedSqlGenerator::new()),
        PipelineOptions::default(),
    );

    let output = pipeline.run_query("Who are my users?").await;

    assert!(output.contains("Generated SQL:\nSELECT * FROM users LIMIT 5"));
    assert!(output.contains("id\tname\temail\tage\tcreated_at"));
    assert!(output.contains("1\tZhang San\tzhangsan@example.com\t28\t"));
    // Header plus four users.
    let table = output.split("Query Results:\n").nth(1).unwrap();
    assert_eq!(table.trim_end().lines().count(), 5);
}

#[tokio::test]
async fn test_aggregate_question() {
    let client = sample_client().await;
    let llm = MockLlmClient::new().with_response(
        "total sales",
        "```sql\nSELECT p.name, SUM(o.quantity) AS total_sold\nFROM orders o JOIN products p ON o.product_id = p.id\nGROUP BY p.name\nORDER BY total_sold DESC, p.name\n```",
    );
    let pipeline = Pipeline::new(client, mock_generator(llm), PipelineOptions::default());

    let state = pipeline.run_query_state("Count total sales for each product").await;

    assert_eq!(state.error_message(), None);
    assert_eq!(state.records().len(), 5);
    assert_eq!(
        state.records()[0].get("name"),
        Some(&Value::String("Mouse".to_string()))
    );
    assert_eq!(state.records()[0].get("total_sold"), Some(&Value::Int(3)));
}

#[tokio::test]
async fn test_generation_failure_renders_only_error() {
    let client = sample_client().await;
    let generator = LlmSqlGenerator::new(Box::new(FailingLlmClient::new("connection reset")));
    let pipeline = Pipeline::new(client, Box::new(generator), PipelineOptions::default());

    let state = pipeline.run_query_state("Show all users").await;

    assert_eq!(state.stage(), Stage::Formatted);
    assert!(state.records().is_empty());
    assert_eq!(
        state.formatted_output(),
        "\nError:\nError generating SQL: connection reset\n"
    );
}

#[tokio::test]
async fn test_update_is_rejected_and_data_untouched() {
    let client = sample_client().await;
    let generator = CannedSqlGenerator::with_sql("UPDATE users SET age = 99");
    let pipeline = Pipeline::new(client.clone(), Box::new(generator), PipelineOptions::default());

    let output = pipeline.run_query("Make everyone 99").await;

    assert!(output.starts_with("\nError:\n"));
    assert!(output.contains(
        "Query contains potentially dangerous operations. Only SELECT queries are allowed by default."
    ));

    let ages = client
        .execute_query("SELECT COUNT(*) FROM users WHERE age = 99")
        .await
        .unwrap();
    assert_eq!(ages.rows[0][0], Value::Int(0));
}

#[tokio::test]
async fn test_destructive_statement_runs_when_gate_disabled() {
    let client = sample_client().await;
    let generator = CannedSqlGenerator::with_sql("DELETE FROM orders WHERE user_id = 1");
    let options = PipelineOptions {
        check_safety: false,
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(client.clone(), Box::new(generator), options);

    let output = pipeline.run_query("Remove the first user's orders").await;

    assert!(output.contains("Query Results:\nNo results returned."));
    assert_eq!(count_rows(client.as_ref(), "orders").await, 4);
}

#[tokio::test]
async fn test_execution_failure_is_reported() {
    let client = sample_client().await;
    let generator = CannedSqlGenerator::with_sql("SELECT * FROM invoices");
    let pipeline = Pipeline::new(client, Box::new(generator), PipelineOptions::default());

    let state = pipeline.run_query_state("Show invoices").await;

    let error = state.error_message().unwrap();
    assert!(error.starts_with("Error executing SQL:"));
    assert!(error.contains("invoices"));
    assert_eq!(state.sql(), "SELECT * FROM invoices");
    assert!(state.records().is_empty());
}

#[tokio::test]
async fn test_cached_schema_is_stale_until_invalidated() {
    let client = sample_client().await;
    let pipeline = Pipeline::new(
        client.clone(),
        Box::new(CannedSqlGenerator::with_sql("SELECT 1")),
        PipelineOptions::default(),
    );

    pipeline.run_query("warm the cache").await;
    client
        .execute_script("CREATE TABLE reviews (id INTEGER PRIMARY KEY, body TEXT)")
        .await
        .unwrap();

    let state = pipeline.run_query_state("again").await;
    assert!(!state.schema_text().contains("Table: reviews"));

    pipeline.schema_provider().invalidate();
    let state = pipeline.run_query_state("after invalidate").await;
    assert!(state.schema_text().contains("Table: reviews"));
}

#[tokio::test]
async fn test_uncached_schema_is_always_fresh() {
    let client = sample_client().await;
    let options = PipelineOptions {
        cache_schema: false,
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(
        client.clone(),
        Box::new(CannedSqlGenerator::with_sql("SELECT 1")),
        options,
    );

    pipeline.run_query("first").await;
    client
        .execute_script("CREATE TABLE reviews (id INTEGER PRIMARY KEY)")
        .await
        .unwrap();

    let state = pipeline.run_query_state("second").await;
    assert!(state.schema_text().contains("Table: reviews"));
}

#[tokio::test]
async fn test_long_values_are_truncated() {
    let client = sample_client().await;
    let options = PipelineOptions {
        max_cell_width: 8,
        ..PipelineOptions::default()
    };
    let generator = CannedSqlGenerator::with_sql("SELECT email FROM users WHERE id = 1");
    let pipeline = Pipeline::new(client, Box::new(generator), options);

    let output = pipeline.run_query("First user's email").await;

    assert!(output.contains("Query Results:\nemail\nzhang...\n"));
}

#[tokio::test]
async fn test_repeated_column_names_keep_last_value() {
    let client = memory_client().await;
    client
        .execute_script(
            "CREATE TABLE a (id INTEGER); CREATE TABLE b (id INTEGER);
             INSERT INTO a VALUES (1); INSERT INTO b VALUES (2);",
        )
        .await
        .unwrap();
    let generator = CannedSqlGenerator::with_sql("SELECT a.id, b.id FROM a, b");
    let pipeline = Pipeline::new(client, Box::new(generator), PipelineOptions::default());

    let output = pipeline.run_query("Pair the ids").await;

    assert!(output.ends_with("Query Results:\nid\n2\n"));
}
