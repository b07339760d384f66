//! Query execution for askdb.
//!
//! Isolates the safety gate and statement execution from the pipeline
//! orchestrator.

pub mod executor;

pub use executor::QueryExecutor;
