//! The natural-language-to-SQL pipeline.
//!
//! [`Pipeline`] wires the schema provider, a [`crate::llm::SqlGenerator`], the
//! query executor and the formatter together. Its behavior is fixed by
//! [`PipelineOptions`], which the caller passes in.

mod orchestrator;
mod state;

pub use orchestrator::Pipeline;
pub use state::{PipelineState, Stage};

use serde::{Deserialize, Serialize};

use crate::format::DEFAULT_MAX_CELL_WIDTH;

/// Options consumed by the pipeline, read from the `[pipeline]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Reuse the schema snapshot across runs.
    pub cache_schema: bool,
    /// Reject statements containing destructive keywords before execution.
    pub check_safety: bool,
    /// Maximum characters per table cell.
    pub max_cell_width: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            cache_schema: true,
            check_safety: true,
            max_cell_width: DEFAULT_MAX_CELL_WIDTH,
        }
    }
}
