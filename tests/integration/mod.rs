//! Shared fixtures for the integration tests.

pub mod pipeline_test;
pub mod postgres_test;
pub mod sqlite_test;

use std::sync::Arc;

use askdb::config::ConnectionConfig;
use askdb::db::{DatabaseClient, SqliteClient};

/// The sample shop database shipped in `demos/`.
pub const SAMPLE_SQL: &str = include_str!("../../demos/sample.sql");

/// Opens a fresh in-memory SQLite database.
pub async fn memory_client() -> Arc<SqliteClient> {
    let config = ConnectionConfig::from_connection_string("sqlite::memory:").unwrap();
    Arc::new(SqliteClient::connect(&config).await.unwrap())
}

/// Opens an in-memory database loaded with the sample shop data.
pub async fn sample_client() -> Arc<SqliteClient> {
    let client = memory_client().await;
    client.execute_script(SAMPLE_SQL).await.unwrap();
    client
}
