//! Pure-Rust engine backed by the `geo` algorithm crate.
//!
//! # Design
//!
//! Contexts live in a map from [`ContextHandle`] to a [`ContextArena`]. Each
//! call resolves its context, clones the operand geometries out of the arena
//! (cheap `Arc` clones) and runs the `geo` algorithm without holding any lock,
//! so read-style calls on one context proceed in parallel.
//!
//! Every failure cause is an [`EngineError`] internally. At the trait boundary
//! it is logged and replaced by the call's sentinel. Panics inside `geo`
//! algorithms are contained the same way.

use crate::arena::ContextArena;
use crate::engine::GeometryEngine;
use crate::error::{EngineError, Result};
use crate::geometry::{
    difference_geometries, from_multi_polygon, has_finite_coords, parse_wkt, simplify_geometry,
    union_geometries, write_wkt,
};
use crate::handle::{ContextHandle, GeomHandle, Ternary};
use crate::stats::{EngineStats, EngineStatsSnapshot};
use geo::{Buffer, Distance, Euclidean, Intersects, Relate, Validation};
use geo_types::Geometry;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type SharedGeometry = Arc<Geometry<f64>>;

/// Geometry engine over `geo` / `geo-types`.
///
/// Holds no process-global state: any number of engines and contexts can be
/// created and finished independently.
pub struct GeoEngine {
    contexts: RwLock<FxHashMap<ContextHandle, Arc<ContextArena>>>,
    next_id: AtomicU64,
    stats: EngineStats,
}

impl GeoEngine {
    /// Create an engine with no contexts.
    pub fn new() -> Self {
        Self {
            contexts: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
            stats: EngineStats::default(),
        }
    }

    /// Snapshot of the engine counters.
    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of geometries currently allocated across all contexts.
    pub fn live_geometries(&self) -> usize {
        self.contexts.read().values().map(|arena| arena.len()).sum()
    }

    /// Number of geometries allocated in one context, `None` if it is gone.
    pub fn context_geometries(&self, ctx: ContextHandle) -> Option<usize> {
        self.contexts.read().get(&ctx).map(|arena| arena.len())
    }

    /// Number of live contexts.
    pub fn live_contexts(&self) -> usize {
        self.contexts.read().len()
    }

    fn next_raw(&self) -> u64 {
        // Starts at 1 and only grows, so ids are never null.
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn arena(&self, ctx: ContextHandle) -> Result<Arc<ContextArena>> {
        match self.contexts.read().get(&ctx) {
            Some(arena) => Ok(Arc::clone(arena)),
            None => {
                self.stats.record_dead_context_call();
                Err(EngineError::DeadContext(ctx))
            }
        }
    }

    fn operand(&self, ctx: ContextHandle, handle: GeomHandle) -> Result<SharedGeometry> {
        let geom = self
            .arena(ctx)?
            .get(handle)
            .ok_or(EngineError::UnknownGeometry(handle))?;
        check_finite(&geom)?;
        Ok(geom)
    }

    fn operands(
        &self,
        ctx: ContextHandle,
        a: GeomHandle,
        b: GeomHandle,
    ) -> Result<(SharedGeometry, SharedGeometry)> {
        let (ga, gb) = self.arena(ctx)?.get_pair(a, b);
        let ga = ga.ok_or(EngineError::UnknownGeometry(a))?;
        let gb = gb.ok_or(EngineError::UnknownGeometry(b))?;
        check_finite(&ga)?;
        check_finite(&gb)?;
        Ok((ga, gb))
    }

    /// Store a result geometry in the context and hand out its handle.
    fn alloc(&self, ctx: ContextHandle, geom: Geometry<f64>) -> Result<GeomHandle> {
        let arena = self.arena(ctx)?;
        let handle = GeomHandle::from_raw(self.next_raw())
            .ok_or(EngineError::NoResult("handle allocation"))?;
        arena.insert(handle, geom);
        self.stats.record_geometry_created();
        Ok(handle)
    }

    fn overlay(
        &self,
        op: &'static str,
        ctx: ContextHandle,
        a: GeomHandle,
        b: GeomHandle,
        apply: impl FnOnce(&Geometry<f64>, &Geometry<f64>) -> Result<Geometry<f64>>,
    ) -> Result<GeomHandle> {
        let (ga, gb) = self.operands(ctx, a, b)?;
        let result = contained(op, || apply(ga.as_ref(), gb.as_ref()))??;
        self.alloc(ctx, result)
    }
}

impl Default for GeoEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn check_finite(geom: &Geometry<f64>) -> Result<()> {
    if has_finite_coords(geom) {
        Ok(())
    } else {
        Err(EngineError::NonFinite)
    }
}

/// Run a `geo` algorithm, turning a panic into an error.
fn contained<T>(op: &'static str, f: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|_| EngineError::Panicked(op))
}

fn report(op: &'static str, err: &EngineError) {
    match err {
        EngineError::DeadContext(_) | EngineError::Panicked(_) => {
            tracing::warn!(op, error = %err, "geometry engine call failed");
        }
        _ => tracing::debug!(op, error = %err, "geometry engine call failed"),
    }
}

/// Nullable-handle convention: `None` on failure.
fn nullable<T>(op: &'static str, result: Result<T>) -> Option<T> {
    result.map_err(|e| report(op, &e)).ok()
}

/// Ternary convention: `Exception` on failure.
fn ternary(op: &'static str, result: Result<bool>) -> Ternary {
    match result {
        Ok(value) => Ternary::from(value),
        Err(e) => {
            report(op, &e);
            Ternary::Exception
        }
    }
}

impl GeometryEngine for GeoEngine {
    fn init(&self) -> Option<ContextHandle> {
        self.stats.record_call();
        let ctx = ContextHandle::from_raw(self.next_raw())?;
        self.contexts.write().insert(ctx, Arc::new(ContextArena::new()));
        self.stats.record_context_created();
        tracing::debug!(?ctx, "geometry engine context created");
        Some(ctx)
    }

    fn finish(&self, ctx: ContextHandle) {
        self.stats.record_call();
        let removed = self.contexts.write().remove(&ctx);
        match removed {
            Some(arena) => {
                let reclaimed = arena.clear();
                self.stats.record_context_finished(reclaimed);
                tracing::debug!(?ctx, reclaimed, "geometry engine context finished");
            }
            None => tracing::debug!(?ctx, "finish on unknown context ignored"),
        }
    }

    fn geom_from_wkt(&self, ctx: ContextHandle, wkt: &str) -> Option<GeomHandle> {
        self.stats.record_call();
        nullable(
            "geom_from_wkt",
            self.arena(ctx)
                .and_then(|_| parse_wkt(wkt))
                .and_then(|geom| self.alloc(ctx, geom)),
        )
    }

    fn is_valid(&self, ctx: ContextHandle, geom: GeomHandle) -> Ternary {
        self.stats.record_call();
        let result = self
            .arena(ctx)
            .and_then(|arena| arena.get(geom).ok_or(EngineError::UnknownGeometry(geom)))
            .and_then(|g| contained("is_valid", || g.is_valid()));
        ternary("is_valid", result)
    }

    fn geom_destroy(&self, ctx: ContextHandle, geom: GeomHandle) {
        self.stats.record_call();
        let arena = match self.arena(ctx) {
            Ok(arena) => arena,
            Err(e) => {
                report("geom_destroy", &e);
                return;
            }
        };
        if arena.remove(geom) {
            self.stats.record_geometry_destroyed();
            tracing::trace!(?ctx, ?geom, "geometry destroyed");
        } else {
            self.stats.record_invalid_destroy();
            tracing::warn!(?ctx, ?geom, "destroy of unallocated geometry handle");
        }
    }

    fn geom_to_wkt(&self, ctx: ContextHandle, geom: GeomHandle) -> Option<String> {
        self.stats.record_call();
        let result = self
            .arena(ctx)
            .and_then(|arena| arena.get(geom).ok_or(EngineError::UnknownGeometry(geom)))
            .and_then(|g| contained("geom_to_wkt", || write_wkt(&g)));
        nullable("geom_to_wkt", result)
    }

    fn within(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Ternary {
        self.stats.record_call();
        let result = self
            .operands(ctx, a, b)
            .and_then(|(ga, gb)| contained("within", || ga.relate(&*gb).is_within()));
        ternary("within", result)
    }

    fn intersects(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Ternary {
        self.stats.record_call();
        let result = self
            .operands(ctx, a, b)
            .and_then(|(ga, gb)| contained("intersects", || ga.intersects(&*gb)));
        ternary("intersects", result)
    }

    fn distance(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle, out: &mut f64) -> bool {
        self.stats.record_call();
        let result = self
            .operands(ctx, a, b)
            .and_then(|(ga, gb)| contained("distance", || Euclidean.distance(&*ga, &*gb)))
            .and_then(|d| {
                if d.is_finite() {
                    Ok(d)
                } else {
                    Err(EngineError::NoResult("distance"))
                }
            });
        match nullable("distance", result) {
            Some(d) => {
                *out = d;
                true
            }
            None => false,
        }
    }

    fn buffer(&self, ctx: ContextHandle, geom: GeomHandle, width: f64) -> Option<GeomHandle> {
        self.stats.record_call();
        let result = (|| {
            if !width.is_finite() {
                return Err(EngineError::InvalidParameter {
                    name: "buffer width",
                    value: width,
                });
            }
            let g = self.operand(ctx, geom)?;
            let buffered = contained("buffer", || g.buffer(width))?;
            self.alloc(ctx, from_multi_polygon(buffered))
        })();
        nullable("buffer", result)
    }

    fn simplify(
        &self,
        ctx: ContextHandle,
        geom: GeomHandle,
        tolerance: f64,
    ) -> Option<GeomHandle> {
        self.stats.record_call();
        let result = (|| {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(EngineError::InvalidParameter {
                    name: "simplify tolerance",
                    value: tolerance,
                });
            }
            let g = self.operand(ctx, geom)?;
            let simplified = contained("simplify", || simplify_geometry(&g, tolerance))?;
            self.alloc(ctx, simplified)
        })();
        nullable("simplify", result)
    }

    fn union(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Option<GeomHandle> {
        self.stats.record_call();
        nullable(
            "union",
            self.overlay("union", ctx, a, b, union_geometries),
        )
    }

    fn difference(
        &self,
        ctx: ContextHandle,
        a: GeomHandle,
        b: GeomHandle,
    ) -> Option<GeomHandle> {
        self.stats.record_call();
        nullable(
            "difference",
            self.overlay("difference", ctx, a, b, difference_geometries),
        )
    }
}
