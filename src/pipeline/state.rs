//! The value threaded through the pipeline stages.
//!
//! Each stage takes the previous state by value and returns the next one, so
//! a field is only ever written by the stage that owns it:
//!
//! | stage           | writes                 |
//! |-----------------|------------------------|
//! | `SchemaFetched` | `schema_text`          |
//! | `SqlGenerated`  | `sql`                  |
//! | `Executed`      | `records`              |
//! | `Failed`        | `error_message`        |
//! | `Formatted`     | `formatted_output`     |

use std::fmt;

use crate::db::Record;
use crate::error::AskError;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    SchemaFetched,
    SqlGenerated,
    Executed,
    /// A stage failed; only formatting remains.
    Failed,
    /// Terminal.
    Formatted,
}

impl Stage {
    /// Returns true once no stage but formatting may run.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    fn can_fail(&self) -> bool {
        matches!(self, Self::Start | Self::SchemaFetched | Self::SqlGenerated)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::SchemaFetched => "schema_fetched",
            Self::SqlGenerated => "sql_generated",
            Self::Executed => "executed",
            Self::Failed => "failed",
            Self::Formatted => "formatted",
        };
        f.write_str(name)
    }
}

/// The state of one question as it moves through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    stage: Stage,
    question: String,
    schema_text: String,
    sql: String,
    records: Vec<Record>,
    error_message: Option<String>,
    formatted_output: String,
}

impl PipelineState {
    /// Starts a run for `question`. Every other field is empty.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            stage: Stage::Start,
            question: question.into(),
            schema_text: String::new(),
            sql: String::new(),
            records: Vec::new(),
            error_message: None,
            formatted_output: String::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn schema_text(&self) -> &str {
        &self.schema_text
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn formatted_output(&self) -> &str {
        &self.formatted_output
    }

    /// Consumes the state, returning the rendered report.
    pub fn into_output(self) -> String {
        self.formatted_output
    }

    pub(crate) fn with_schema(self, schema_text: String) -> Self {
        if self.stage != Stage::Start {
            return self.out_of_order("schema");
        }
        Self {
            stage: Stage::SchemaFetched,
            schema_text,
            ..self
        }
    }

    pub(crate) fn with_sql(self, sql: String) -> Self {
        if self.stage != Stage::SchemaFetched {
            return self.out_of_order("SQL");
        }
        Self {
            stage: Stage::SqlGenerated,
            sql,
            ..self
        }
    }

    pub(crate) fn with_records(self, records: Vec<Record>) -> Self {
        if self.stage != Stage::SqlGenerated {
            return self.out_of_order("records");
        }
        Self {
            stage: Stage::Executed,
            records,
            ..self
        }
    }

    /// Records a failure. Execution failures also clear any records.
    pub(crate) fn with_error(self, message: String) -> Self {
        if !self.stage.can_fail() {
            return self.out_of_order("failure");
        }
        self.failed(message)
    }

    pub(crate) fn with_output(self, formatted_output: String) -> Self {
        if !matches!(self.stage, Stage::Executed | Stage::Failed) {
            return self.out_of_order("output");
        }
        Self {
            stage: Stage::Formatted,
            formatted_output,
            ..self
        }
    }

    fn failed(self, message: String) -> Self {
        Self {
            stage: Stage::Failed,
            records: Vec::new(),
            error_message: Some(message),
            ..self
        }
    }

    /// A transition applied at the wrong stage. The first recorded failure
    /// and a finished report are never replaced.
    fn out_of_order(self, field: &str) -> Self {
        match self.stage {
            Stage::Failed | Stage::Formatted => self,
            stage => {
                let error =
                    AskError::internal(format!("Cannot record {field} at stage {stage}"));
                self.failed(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;

    #[test]
    fn test_new_state_is_empty() {
        let state = PipelineState::new("Show all users");

        assert_eq!(state.stage(), Stage::Start);
        assert_eq!(state.question(), "Show all users");
        assert_eq!(state.schema_text(), "");
        assert_eq!(state.sql(), "");
        assert!(state.records().is_empty());
        assert_eq!(state.error_message(), None);
        assert_eq!(state.formatted_output(), "");
    }

    #[test]
    fn test_happy_path_transitions() {
        let record = Record::from_iter([("id", Value::Int(1))]);
        let state = PipelineState::new("q")
            .with_schema("\nTable: users".to_string())
            .with_sql("SELECT * FROM users".to_string())
            .with_records(vec![record.clone()])
            .with_output("report".to_string());

        assert_eq!(state.stage(), Stage::Formatted);
        assert_eq!(state.schema_text(), "\nTable: users");
        assert_eq!(state.sql(), "SELECT * FROM users");
        assert_eq!(state.records(), &[record]);
        assert_eq!(state.into_output(), "report");
    }

    #[test]
    fn test_failure_keeps_earlier_fields() {
        let state = PipelineState::new("q")
            .with_schema("schema".to_string())
            .with_sql("UPDATE users SET age = 99".to_string())
            .with_error("rejected".to_string());

        assert!(state.stage().is_failed());
        assert_eq!(state.sql(), "UPDATE users SET age = 99");
        assert_eq!(state.error_message(), Some("rejected"));
        assert!(state.records().is_empty());

        let state = state.with_output("err".to_string());
        assert_eq!(state.stage(), Stage::Formatted);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::SqlGenerated.to_string(), "sql_generated");
        assert_eq!(Stage::Failed.to_string(), "failed");
    }

    #[test]
    fn test_out_of_order_transition_fails_with_internal_error() {
        let record = Record::from_iter([("id", Value::Int(1))]);
        let state = PipelineState::new("q").with_records(vec![record]);

        assert_eq!(state.stage(), Stage::Failed);
        assert!(state.records().is_empty());
        assert_eq!(
            state.error_message(),
            Some("Internal error: Cannot record records at stage start")
        );
    }

    #[test]
    fn test_skipped_stage_is_an_internal_error() {
        let state = PipelineState::new("q")
            .with_schema("schema".to_string())
            .with_output("report".to_string());

        assert_eq!(state.stage(), Stage::Failed);
        assert_eq!(state.formatted_output(), "");
        assert_eq!(
            state.error_message(),
            Some("Internal error: Cannot record output at stage schema_fetched")
        );
    }

    #[test]
    fn test_first_failure_is_kept() {
        let state = PipelineState::new("q")
            .with_error("schema unavailable".to_string())
            .with_sql("SELECT 1".to_string())
            .with_error("second".to_string());

        assert_eq!(state.error_message(), Some("schema unavailable"));
        assert_eq!(state.sql(), "");

        let state = state.with_output("report".to_string());
        let state = state.with_schema("late".to_string());
        assert_eq!(state.stage(), Stage::Formatted);
        assert_eq!(state.schema_text(), "");
        assert_eq!(state.formatted_output(), "report");
    }
}
