//! Per-context geometry arena.
//!
//! Every context owns one arena mapping geometry handles to parsed
//! geometries. Entries are `Arc`-shared so an operation can clone its operands
//! out of the arena and run the algorithm without holding the arena lock.
//!
//! Handles come from an id counter owned by the engine, so they are unique
//! across contexts: a handle presented to the wrong context is simply not
//! found.

use crate::handle::GeomHandle;
use geo_types::Geometry;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Geometry arena for one context.
#[derive(Default)]
pub struct ContextArena {
    entries: RwLock<FxHashMap<GeomHandle, Arc<Geometry<f64>>>>,
}

impl ContextArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a geometry under `handle`.
    pub fn insert(&self, handle: GeomHandle, geom: Geometry<f64>) {
        self.entries.write().insert(handle, Arc::new(geom));
    }

    /// Get a geometry by handle.
    pub fn get(&self, handle: GeomHandle) -> Option<Arc<Geometry<f64>>> {
        self.entries.read().get(&handle).cloned()
    }

    /// Get two geometries under one lock acquisition.
    pub fn get_pair(
        &self,
        a: GeomHandle,
        b: GeomHandle,
    ) -> (Option<Arc<Geometry<f64>>>, Option<Arc<Geometry<f64>>>) {
        let entries = self.entries.read();
        (entries.get(&a).cloned(), entries.get(&b).cloned())
    }

    /// Remove a geometry. Returns `false` if the handle was not allocated.
    pub fn remove(&self, handle: GeomHandle) -> bool {
        self.entries.write().remove(&handle).is_some()
    }

    /// Drop every entry, returning how many were still allocated.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let n = entries.len();
        entries.clear();
        n
    }

    /// Number of allocated geometries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
