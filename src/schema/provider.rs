//! Schema snapshot provider.
//!
//! Introspects the database into the plain-text description used to ground
//! SQL generation, and keeps it in a [`SchemaCache`] when caching is enabled.

use std::sync::Arc;

use tracing::{debug, info};

use super::SchemaCache;
use crate::db::{Column, DatabaseClient, Table};
use crate::error::{AskError, Result};

/// Produces schema snapshots for one database.
pub struct SchemaProvider {
    client: Arc<dyn DatabaseClient>,
    cache: SchemaCache,
    caching_enabled: bool,
}

impl SchemaProvider {
    /// Creates a provider over `client`, storing snapshots in `cache` when
    /// `caching_enabled`.
    pub fn new(client: Arc<dyn DatabaseClient>, cache: SchemaCache, caching_enabled: bool) -> Self {
        Self {
            client,
            cache,
            caching_enabled,
        }
    }

    /// Returns the schema snapshot.
    ///
    /// With `use_cache` and caching enabled, a stored snapshot is returned
    /// without touching the database. Otherwise the database is introspected
    /// and, if caching is enabled, the fresh snapshot is stored.
    pub async fn get_schema(&self, use_cache: bool) -> Result<String> {
        if use_cache && self.caching_enabled {
            if let Some(cached) = self.cache.get() {
                debug!("Using cached database schema");
                return Ok(cached.to_string());
            }
        }

        let tables = self.introspect().await.map_err(|e| match e {
            AskError::SchemaRetrieval(_) => e,
            other => AskError::schema(other.to_string()),
        })?;
        let schema = render_schema(&tables);

        if self.caching_enabled {
            self.cache.store(&schema);
            debug!("Schema cached successfully");
        }

        Ok(schema)
    }

    /// Clears the cached snapshot.
    pub fn invalidate(&self) {
        self.cache.clear();
        debug!("Schema cache cleared");
    }

    /// Returns the cache handle this provider writes to.
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    async fn introspect(&self) -> Result<Vec<Table>> {
        let names = self.client.list_tables().await?;
        info!("Retrieved {} tables from database", names.len());

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = self.client.list_columns(&name).await?;
            tables.push(Table { name, columns });
        }
        Ok(tables)
    }
}

/// Renders tables as the schema text sent to the generator.
///
/// Each table contributes a `"\nTable: <name>"` part followed by one
/// `"  - <column>: <type>[ NOT NULL]"` part per column; parts are joined
/// with newlines.
pub fn render_schema(tables: &[Table]) -> String {
    tables
        .iter()
        .flat_map(|table| {
            std::iter::once(format!("\nTable: {}", table.name))
                .chain(table.columns.iter().map(render_column))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_column(column: &Column) -> String {
    let mut line = format!("  - {}: {}", column.name, column.data_type);
    if !column.is_nullable {
        line.push_str(" NOT NULL");
    }
    line
}
