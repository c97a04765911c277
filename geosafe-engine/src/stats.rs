//! Engine call and allocation counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters kept by [`GeoEngine`](crate::GeoEngine).
#[derive(Debug, Default)]
pub struct EngineStats {
    calls: AtomicU64,
    contexts_created: AtomicU64,
    contexts_finished: AtomicU64,
    geometries_created: AtomicU64,
    geometries_destroyed: AtomicU64,
    geometries_reclaimed: AtomicU64,
    invalid_destroys: AtomicU64,
    dead_context_calls: AtomicU64,
}

impl EngineStats {
    pub(crate) fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_context_created(&self) {
        self.contexts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_context_finished(&self, reclaimed: usize) {
        self.contexts_finished.fetch_add(1, Ordering::Relaxed);
        self.geometries_reclaimed
            .fetch_add(reclaimed as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_geometry_created(&self) {
        self.geometries_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_geometry_destroyed(&self) {
        self.geometries_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid_destroy(&self) {
        self.invalid_destroys.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dead_context_call(&self) {
        self.dead_context_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            contexts_created: self.contexts_created.load(Ordering::Relaxed),
            contexts_finished: self.contexts_finished.load(Ordering::Relaxed),
            geometries_created: self.geometries_created.load(Ordering::Relaxed),
            geometries_destroyed: self.geometries_destroyed.load(Ordering::Relaxed),
            geometries_reclaimed: self.geometries_reclaimed.load(Ordering::Relaxed),
            invalid_destroys: self.invalid_destroys.load(Ordering::Relaxed),
            dead_context_calls: self.dead_context_calls.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatsSnapshot {
    /// Every trait call, including `init` and `finish`.
    pub calls: u64,
    pub contexts_created: u64,
    pub contexts_finished: u64,
    pub geometries_created: u64,
    /// Destroyed individually through `geom_destroy`.
    pub geometries_destroyed: u64,
    /// Still allocated when their context was finished.
    pub geometries_reclaimed: u64,
    /// `geom_destroy` on a handle that was not allocated (double free).
    pub invalid_destroys: u64,
    /// Calls naming an unknown or finished context.
    pub dead_context_calls: u64,
}

impl EngineStatsSnapshot {
    /// Contexts created and not yet finished.
    pub fn live_contexts(&self) -> u64 {
        self.contexts_created.saturating_sub(self.contexts_finished)
    }
}
