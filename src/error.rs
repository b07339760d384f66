//! Error types for askdb.
//!
//! Every failure the pipeline can hit is a variant of [`AskError`]. The four
//! pipeline leaves (schema, generation, unsafe query, execution) are caught at
//! their stage boundary and rendered into the report; the remaining variants
//! surface during startup.

use thiserror::Error;

/// Main error type for askdb operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AskError {
    /// The database could not be introspected.
    #[error("Schema retrieval error: {0}")]
    SchemaRetrieval(String),

    /// The generation capability failed or returned nothing usable.
    #[error("Error generating SQL: {0}")]
    Generation(String),

    /// The safety gate rejected the statement before it reached the database.
    #[error("{0}")]
    UnsafeQuery(String),

    /// The database rejected or failed to run the statement.
    #[error("Error executing SQL: {0}")]
    Execution(String),

    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failures that no stage anticipated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AskError {
    /// Creates a schema retrieval error with the given message.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaRetrieval(msg.into())
    }

    /// Creates a generation error with the given message.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Creates an unsafe query error with the given message.
    pub fn unsafe_query(msg: impl Into<String>) -> Self {
        Self::UnsafeQuery(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::SchemaRetrieval(_) => "Schema Error",
            Self::Generation(_) => "Generation Error",
            Self::UnsafeQuery(_) => "Unsafe Query",
            Self::Execution(_) => "Execution Error",
            Self::Connection(_) => "Connection Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for the failures a pipeline stage records into its state.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self,
            Self::SchemaRetrieval(_) | Self::Generation(_) | Self::UnsafeQuery(_) | Self::Execution(_)
        )
    }
}

/// Result type alias using AskError.
pub type Result<T> = std::result::Result<T, AskError>;
