//! Runs one question through schema, generation, execution and formatting.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, instrument};

use super::{PipelineOptions, PipelineState};
use crate::db::DatabaseClient;
use crate::error::{AskError, Result};
use crate::format::format_report;
use crate::llm::SqlGenerator;
use crate::query::QueryExecutor;
use crate::schema::{SchemaCache, SchemaProvider};

/// The question-answering pipeline.
///
/// Stages run strictly one after another. A failing stage records its
/// message and every later stage except formatting is skipped, so
/// [`Pipeline::run_query`] always produces a report.
pub struct Pipeline {
    schema: SchemaProvider,
    generator: Box<dyn SqlGenerator>,
    executor: QueryExecutor,
    options: PipelineOptions,
}

impl Pipeline {
    /// Builds a pipeline with its own, initially empty, schema cache.
    pub fn new(
        client: Arc<dyn DatabaseClient>,
        generator: Box<dyn SqlGenerator>,
        options: PipelineOptions,
    ) -> Self {
        Self::with_cache(client, generator, options, SchemaCache::new())
    }

    /// Builds a pipeline that shares `cache` with whoever else holds it.
    pub fn with_cache(
        client: Arc<dyn DatabaseClient>,
        generator: Box<dyn SqlGenerator>,
        options: PipelineOptions,
        cache: SchemaCache,
    ) -> Self {
        Self {
            schema: SchemaProvider::new(client.clone(), cache, options.cache_schema),
            generator,
            executor: QueryExecutor::new(client),
            options,
        }
    }

    pub fn schema_provider(&self) -> &SchemaProvider {
        &self.schema
    }

    /// Answers `question` with a formatted report. Never fails.
    pub async fn run_query(&self, question: &str) -> String {
        self.run_query_state(question).await.into_output()
    }

    /// Like [`Pipeline::run_query`] but returns the final state.
    #[instrument(skip(self))]
    pub async fn run_query_state(&self, question: &str) -> PipelineState {
        let state = PipelineState::new(question);
        let state = self.fetch_schema(state).await;
        let state = self.generate_sql(state).await;
        let state = self.execute_sql(state).await;
        self.format_output(state)
    }

    async fn fetch_schema(&self, state: PipelineState) -> PipelineState {
        info!("Retrieving database schema");
        match guarded("schema retrieval", self.schema.get_schema(true)).await {
            Ok(schema) => state.with_schema(schema),
            Err(e) => fail(state, e),
        }
    }

    async fn generate_sql(&self, state: PipelineState) -> PipelineState {
        if state.stage().is_failed() {
            return state;
        }

        info!("Generating SQL");
        let generated = guarded(
            "SQL generation",
            self.generator.generate(state.question(), state.schema_text()),
        )
        .await;

        match generated {
            Ok(sql) => state.with_sql(sql),
            Err(e) => fail(state, e),
        }
    }

    async fn execute_sql(&self, state: PipelineState) -> PipelineState {
        if state.stage().is_failed() {
            return state;
        }

        info!("Executing SQL");
        let executed = guarded(
            "query execution",
            self.executor.execute(state.sql(), self.options.check_safety),
        )
        .await;

        match executed {
            Ok(records) => state.with_records(records),
            Err(e) => fail(state, e),
        }
    }

    fn format_output(&self, state: PipelineState) -> PipelineState {
        let output = format_report(
            state.question(),
            state.sql(),
            state.records(),
            state.error_message(),
            self.options.max_cell_width,
        );
        state.with_output(output)
    }
}

fn fail(state: PipelineState, e: AskError) -> PipelineState {
    error!(category = e.category(), "{}", e);
    state.with_error(e.to_string())
}

/// Awaits one stage, turning a panic inside it into an internal error.
async fn guarded<T, F>(stage: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(AskError::internal(format!(
            "Unexpected error during {stage}: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
