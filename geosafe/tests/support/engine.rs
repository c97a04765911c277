//! Scripted engine for failure injection.
//!
//! Wraps the built-in `GeoEngine`, records every call by name, and can be
//! told to return an operation's failure sentinel or to park callers of an
//! operation on a [`Gate`] until the test opens it.

use geosafe_engine::{
    ContextHandle, EngineStatsSnapshot, GeoEngine, GeomHandle, GeometryEngine, Ternary,
};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Gate — parks a thread inside an engine call
// =============================================================================

#[derive(Default)]
pub struct Gate {
    state: Mutex<GateState>,
    cv: Condvar,
}

#[derive(Default)]
struct GateState {
    entered: usize,
    open: bool,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Block until at least one caller is parked at the gate.
    pub fn wait_entered(&self) {
        let mut state = self.state.lock();
        while state.entered == 0 {
            self.cv.wait(&mut state);
        }
    }

    /// Let every parked and future caller through.
    pub fn open(&self) {
        self.state.lock().open = true;
        self.cv.notify_all();
    }

    fn pass(&self) {
        let mut state = self.state.lock();
        state.entered += 1;
        self.cv.notify_all();
        while !state.open {
            self.cv.wait(&mut state);
        }
    }
}

// =============================================================================
// ScriptedEngine
// =============================================================================

pub struct ScriptedEngine {
    inner: GeoEngine,
    calls: Mutex<Vec<&'static str>>,
    /// Remaining successful calls before an operation starts failing.
    failing: Mutex<HashMap<&'static str, usize>>,
    gates: Mutex<HashMap<&'static str, Arc<Gate>>>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            inner: GeoEngine::new(),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Make every call of `op` return its failure sentinel.
    pub fn fail(&self, op: &'static str) {
        self.fail_after(op, 0);
    }

    /// Let `successes` calls of `op` through, then fail the rest.
    pub fn fail_after(&self, op: &'static str, successes: usize) {
        self.failing.lock().insert(op, successes);
    }

    /// Stop failing `op`.
    pub fn heal(&self, op: &'static str) {
        self.failing.lock().remove(op);
    }

    /// Park callers of `op` on `gate`.
    pub fn gate(&self, op: &'static str, gate: Arc<Gate>) {
        self.gates.lock().insert(op, gate);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn live_geometries(&self) -> usize {
        self.inner.live_geometries()
    }

    pub fn live_contexts(&self) -> usize {
        self.inner.live_contexts()
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.inner.stats()
    }

    /// Record the call, wait at its gate, and report whether it should fail.
    fn enter(&self, op: &'static str) -> bool {
        self.calls.lock().push(op);
        let gate = self.gates.lock().get(op).cloned();
        if let Some(gate) = gate {
            gate.pass();
        }
        let mut failing = self.failing.lock();
        match failing.get_mut(op) {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }
}

impl GeometryEngine for ScriptedEngine {
    fn init(&self) -> Option<ContextHandle> {
        if self.enter("init") {
            return None;
        }
        self.inner.init()
    }

    fn finish(&self, ctx: ContextHandle) {
        self.enter("finish");
        self.inner.finish(ctx)
    }

    fn geom_from_wkt(&self, ctx: ContextHandle, wkt: &str) -> Option<GeomHandle> {
        if self.enter("geom_from_wkt") {
            return None;
        }
        self.inner.geom_from_wkt(ctx, wkt)
    }

    fn is_valid(&self, ctx: ContextHandle, geom: GeomHandle) -> Ternary {
        if self.enter("is_valid") {
            return Ternary::Exception;
        }
        self.inner.is_valid(ctx, geom)
    }

    fn geom_destroy(&self, ctx: ContextHandle, geom: GeomHandle) {
        self.enter("geom_destroy");
        self.inner.geom_destroy(ctx, geom)
    }

    fn geom_to_wkt(&self, ctx: ContextHandle, geom: GeomHandle) -> Option<String> {
        if self.enter("geom_to_wkt") {
            return None;
        }
        self.inner.geom_to_wkt(ctx, geom)
    }

    fn within(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Ternary {
        if self.enter("within") {
            return Ternary::Exception;
        }
        self.inner.within(ctx, a, b)
    }

    fn intersects(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Ternary {
        if self.enter("intersects") {
            return Ternary::Exception;
        }
        self.inner.intersects(ctx, a, b)
    }

    fn distance(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle, out: &mut f64) -> bool {
        if self.enter("distance") {
            return false;
        }
        self.inner.distance(ctx, a, b, out)
    }

    fn buffer(&self, ctx: ContextHandle, geom: GeomHandle, width: f64) -> Option<GeomHandle> {
        if self.enter("buffer") {
            return None;
        }
        self.inner.buffer(ctx, geom, width)
    }

    fn simplify(&self, ctx: ContextHandle, geom: GeomHandle, tolerance: f64) -> Option<GeomHandle> {
        if self.enter("simplify") {
            return None;
        }
        self.inner.simplify(ctx, geom, tolerance)
    }

    fn union(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Option<GeomHandle> {
        if self.enter("union") {
            return None;
        }
        self.inner.union(ctx, a, b)
    }

    fn difference(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Option<GeomHandle> {
        if self.enter("difference") {
            return None;
        }
        self.inner.difference(ctx, a, b)
    }
}
