//! Query execution behind the safety gate.
//!
//! The executor owns no connection. The database client checks one out of
//! its pool for each statement and returns it when the call finishes,
//! whatever the outcome.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::db::{DatabaseClient, Record};
use crate::error::{AskError, Result};
use crate::safety;

/// Runs generated SQL and materializes the rows.
#[derive(Clone)]
pub struct QueryExecutor {
    client: Arc<dyn DatabaseClient>,
}

impl QueryExecutor {
    /// Creates a new query executor.
    pub fn new(client: Arc<dyn DatabaseClient>) -> Self {
        Self { client }
    }

    /// Executes `sql` and returns every row as a [`Record`].
    ///
    /// With `check_safety`, a statement the gate rejects fails with
    /// [`AskError::UnsafeQuery`] before the database is touched. Any other
    /// failure is reported as [`AskError::Execution`]; partial results are
    /// never returned.
    pub async fn execute(&self, sql: &str, check_safety: bool) -> Result<Vec<Record>> {
        if check_safety {
            if let Err(e) = safety::check(sql) {
                warn!(%sql, "Blocked unsafe query");
                return Err(e);
            }
        }

        debug!(%sql, "Executing query");
        let start = Instant::now();

        let result = self.client.execute_query(sql).await.map_err(|e| match e {
            AskError::Execution(msg) => AskError::Execution(msg),
            other => AskError::execution(other.to_string()),
        })?;

        let records = result.into_records();
        info!(
            rows = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query executed"
        );
        Ok(records)
    }
}
