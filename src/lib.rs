//! askdb - ask a relational database questions in plain language.
//!
//! A question flows through [`pipeline::Pipeline`]: the schema is introspected
//! (and cached), an LLM turns question and schema into SQL, the safety gate
//! screens the statement, the database runs it, and the rows are rendered as
//! a plain-text report.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod safety;
pub mod schema;
