//! Database abstraction layer for askdb.
//!
//! Provides a trait-based interface for database operations, allowing
//! different database backends to be used interchangeably.

mod mock;
mod postgres;
mod schema;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use schema::{Column, Table};
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Record, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string or URL scheme.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend (0 when not networked).
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Sqlite => 0,
        }
    }
}

/// Creates a database client for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Arc<dyn DatabaseClient>> {
    let config = config.resolved()?;
    info!(
        backend = config.backend.as_str(),
        "Connecting to {}",
        config.display_string()
    );
    match config.backend {
        DatabaseBackend::Postgres => Ok(Arc::new(PostgresClient::connect(&config).await?)),
        DatabaseBackend::Sqlite => Ok(Arc::new(SqliteClient::connect(&config).await?)),
    }
}

/// Trait defining the interface for database clients.
///
/// Introspection calls fail with `AskError::SchemaRetrieval`, statement calls
/// with `AskError::Execution`.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Lists user tables in the database's own enumeration order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Lists the columns of a table in declaration order.
    async fn list_columns(&self, table: &str) -> Result<Vec<Column>>;

    /// Executes a single SQL statement and materializes all of its rows.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Runs a multi-statement script, discarding any rows.
    async fn execute_script(&self, sql: &str) -> Result<()>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
