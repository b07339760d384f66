//! SQLite database client implementation.
//!
//! SQLite is the zero-setup target: a local file, or `sqlite::memory:` for
//! throwaway databases in tests and demos.

use crate::config::ConnectionConfig;
use crate::db::{Column, ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{AskError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// Maximum pooled connections for file databases.
const MAX_CONNECTIONS: u32 = 5;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
    statement_timeout: Option<Duration>,
}

impl SqliteClient {
    /// Opens the database described by `config`.
    ///
    /// A missing database file is created. In-memory databases live as long
    /// as their connection, so they are served by a single connection that is
    /// never recycled.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| AskError::config(format!("Invalid SQLite path: {e}")))?
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                AskError::connection(format!(
                    "Cannot open SQLite database '{}': {e}",
                    config.database.as_deref().unwrap_or("unknown")
                ))
            })?;

        debug!("Opened SQLite database {}", config.display_string());
        Ok(Self {
            pool,
            statement_timeout: config.statement_timeout_secs.map(Duration::from_secs),
        })
    }

    async fn fetch_all(&self, sql: &str) -> std::result::Result<Vec<SqliteRow>, String> {
        let mut conn = self.pool.acquire().await.map_err(|e| e.to_string())?;
        let fetch = sqlx::query(sql).fetch_all(&mut *conn);

        match self.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| format!("Query timed out after {} seconds", limit.as_secs()))?
                .map_err(|e| e.to_string()),
            None => fetch.await.map_err(|e| e.to_string()),
        }
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn list_tables(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AskError::schema(format!("Failed to fetch tables: {e}")))
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<Column>> {
        // PRAGMA arguments cannot be bound; quote the identifier instead.
        let pragma = format!("PRAGMA table_info(\"{}\")", table.replace('"', "\"\""));
        let rows = sqlx::query(&pragma)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AskError::schema(format!("Failed to fetch columns for {table}: {e}")))?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                let data_type: String = row.try_get("type")?;
                let not_null: i64 = row.try_get("notnull")?;
                Ok(Column::new(name, data_type).nullable(not_null == 0))
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| AskError::schema(format!("Failed to read columns for {table}: {e}")))
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();
        let result = self.fetch_all(sql).await.map_err(AskError::execution)?;
        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows = result.iter().map(convert_row).collect::<Result<Vec<Row>>>()?;

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AskError::execution(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Result<Row> {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Converts a single value, going by the value's storage class rather than the
/// declared column type since SQLite columns are dynamically typed.
fn convert_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let read_error = |e: sqlx::Error| {
        AskError::execution(format!(
            "Cannot read column '{}': {e}",
            row.column(index).name()
        ))
    };

    let raw = row.try_get_raw(index).map_err(read_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_uppercase();

    let value = match storage_class.as_str() {
        "BOOLEAN" => Value::Bool(row.try_get(index).map_err(read_error)?),
        "INTEGER" | "INT8" | "BIGINT" => Value::Int(row.try_get(index).map_err(read_error)?),
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            Value::Float(row.try_get(index).map_err(read_error)?)
        }
        "BLOB" => Value::Bytes(row.try_get(index).map_err(read_error)?),
        _ => Value::String(row.try_get(index).map_err(read_error)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn memory_client() -> SqliteClient {
        let config = ConnectionConfig::from_connection_string("sqlite::memory:").unwrap();
        let client = SqliteClient::connect(&config).await.unwrap();
        client
            .execute_script(
                "CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR(100) NOT NULL, age INTEGER);
                 INSERT INTO users (name, age) VALUES ('Alice', 30), ('Bob', NULL);",
            )
            .await
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_list_tables_and_columns() {
        let client = memory_client().await;

        assert_eq!(client.list_tables().await.unwrap(), vec!["users"]);

        let columns = client.list_columns("users").await.unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "age"]);
        assert_eq!(columns[1].data_type, "VARCHAR(100)");
        assert!(!columns[1].is_nullable);
        assert!(columns[2].is_nullable);
    }

    #[tokio::test]
    async fn test_execute_query_converts_values() {
        let client = memory_client().await;

        let result = client
            .execute_query("SELECT id, name, age, 1.5 AS ratio FROM users ORDER BY id")
            .await
            .unwrap();

        assert_eq!(result.columns.len(), 4);
        assert_eq!(result.columns[1].name, "name");
        assert_eq!(
            result.rows,
            vec![
                vec![Value::Int(1), Value::from("Alice"), Value::Int(30), Value::Float(1.5)],
                vec![Value::Int(2), Value::from("Bob"), Value::Null, Value::Float(1.5)],
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_query_error_is_execution_variant() {
        let client = memory_client().await;

        let error = client.execute_query("SELECT * FROM missing").await.unwrap_err();

        assert!(matches!(error, AskError::Execution(_)));
        assert!(error.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_file_database_is_created_and_reopened() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.db");
        let url = format!("sqlite://{}", path.display());
        let config = ConnectionConfig::from_connection_string(&url).unwrap();

        let client = SqliteClient::connect(&config).await.unwrap();
        client
            .execute_script("CREATE TABLE products (id INTEGER, price REAL);")
            .await
            .unwrap();
        client.close().await.unwrap();
        assert!(path.exists());

        let reopened = SqliteClient::connect(&config).await.unwrap();
        assert_eq!(reopened.list_tables().await.unwrap(), vec!["products"]);
        reopened.close().await.unwrap();
    }
}
