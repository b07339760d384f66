//! Schema snapshots for grounding SQL generation.

mod cache;
mod provider;

pub use cache::SchemaCache;
pub use provider::{render_schema, SchemaProvider};
