//! Explicit schema snapshot cache.
//!
//! The cache is a handle rather than a global: clones share one snapshot,
//! separately created caches never see each other's entries.

use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to a cached schema snapshot.
///
/// The lock keeps concurrent access memory-safe but does not coordinate
/// pipelines: two runs that miss at the same time both introspect, and the
/// last store wins.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    snapshot: Arc<RwLock<Option<Arc<str>>>>,
}

impl SchemaCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot, if one is stored.
    pub fn get(&self) -> Option<Arc<str>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the cached snapshot.
    pub fn store(&self, schema: &str) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::from(schema));
    }

    /// Drops the cached snapshot. No-op when empty.
    pub fn clear(&self) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns true if a snapshot is stored.
    pub fn is_valid(&self) -> bool {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
