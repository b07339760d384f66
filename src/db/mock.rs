//! Mock database clients for testing.
//!
//! `MockDatabaseClient` serves a fixed schema and canned results and counts
//! the calls it receives; `FailingDatabaseClient` fails every call.

use super::{Column, DatabaseClient, QueryResult, Table};
use crate::error::{AskError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A mock database client that returns predefined results.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    tables: Vec<Table>,
    /// Canned results keyed by a case-insensitive SQL substring.
    results: Vec<(String, QueryResult)>,
    introspections: AtomicUsize,
    executions: AtomicUsize,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the mock schema.
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Returns `result` for any statement containing `pattern`.
    ///
    /// Patterns are checked in insertion order; unmatched statements return
    /// an empty result.
    pub fn with_result(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.results.push((pattern.into(), result));
        self
    }

    /// Number of full introspections (`list_tables` calls) served.
    pub fn introspection_count(&self) -> usize {
        self.introspections.load(Ordering::SeqCst)
    }

    /// Number of statements executed.
    pub fn execution_count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn list_tables(&self) -> Result<Vec<String>> {
        self.introspections.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<Column>> {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| AskError::schema(format!("no such table: {table}")))
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let sql_lower = sql.to_lowercase();

        Ok(self
            .results
            .iter()
            .find(|(pattern, _)| sql_lower.contains(&pattern.to_lowercase()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default())
    }

    async fn execute_script(&self, _sql: &str) -> Result<()> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every call fails.
#[derive(Debug, Clone)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a client that fails with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Err(AskError::schema(self.message.clone()))
    }

    async fn list_columns(&self, _table: &str) -> Result<Vec<Column>> {
        Err(AskError::schema(self.message.clone()))
    }

    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(AskError::execution(self.message.clone()))
    }

    async fn execute_script(&self, _sql: &str) -> Result<()> {
        Err(AskError::execution(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
