//! SQL generation adapters.
//!
//! [`SqlGenerator`] is the seam the pipeline depends on. The LLM-backed
//! implementation prompts a chat model with the schema snapshot; the canned
//! one answers every question with the same statement.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AskError, Result};
use crate::llm::parser::clean_sql_response;
use crate::llm::prompt::build_messages;
use crate::llm::LlmClient;

/// Statement returned by [`CannedSqlGenerator::new`].
pub const DEFAULT_CANNED_SQL: &str = "SELECT * FROM users LIMIT 5";

/// Turns a question plus schema snapshot into SQL text.
///
/// The only failure kind is [`AskError::Generation`].
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, question: &str, schema: &str) -> Result<String>;
}

/// Generator backed by a chat completion client.
pub struct LlmSqlGenerator {
    client: Box<dyn LlmClient>,
}

impl LlmSqlGenerator {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SqlGenerator for LlmSqlGenerator {
    async fn generate(&self, question: &str, schema: &str) -> Result<String> {
        let messages = build_messages(question, schema);

        let response = self.client.complete(&messages).await.map_err(|e| match e {
            AskError::Generation(msg) => AskError::Generation(msg),
            other => AskError::generation(other.to_string()),
        })?;

        let sql = clean_sql_response(&response);
        if sql.is_empty() {
            return Err(AskError::generation("LLM returned an empty response"));
        }

        debug!(%sql, "Generated SQL");
        Ok(sql)
    }
}

/// Generator that ignores its inputs and returns a fixed statement.
#[derive(Debug, Clone)]
pub struct CannedSqlGenerator {
    sql: String,
}

impl CannedSqlGenerator {
    pub fn new() -> Self {
        Self::with_sql(DEFAULT_CANNED_SQL)
    }

    pub fn with_sql(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

impl Default for CannedSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SqlGenerator for CannedSqlGenerator {
    async fn generate(&self, _question: &str, _schema: &str) -> Result<String> {
        Ok(self.sql.clone())
    }
}
