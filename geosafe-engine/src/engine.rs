//! Geometry engine contract.
//!
//! Abstracts over concrete geometry engines (the built-in [`GeoEngine`] or a
//! binding to a native library) so the facade works identically with either.
//!
//! # Result conventions
//!
//! The contract deliberately keeps the three result shapes of a
//! context-handle C API apart:
//!
//! - **nullable handle**: `None` is the failure sentinel.
//! - **ternary predicate**: [`Ternary::Exception`] is the failure sentinel.
//! - **flag plus out-value**: `false` is the failure sentinel and the out-value
//!   is left untouched.
//!
//! Implementations must never panic across this boundary and must treat calls
//! on an unknown or finished context as failures.
//!
//! [`GeoEngine`]: crate::GeoEngine

use crate::handle::{ContextHandle, GeomHandle, Ternary};

/// Context-handle based geometry engine.
pub trait GeometryEngine: Send + Sync {
    /// Create a new context. `None` if the engine cannot initialize.
    fn init(&self) -> Option<ContextHandle>;

    /// Destroy a context together with every geometry still allocated in it.
    ///
    /// Finishing an unknown context is a no-op.
    fn finish(&self, ctx: ContextHandle);

    /// Parse WKT into a new geometry.
    fn geom_from_wkt(&self, ctx: ContextHandle, wkt: &str) -> Option<GeomHandle>;

    /// Check structural validity of a geometry.
    fn is_valid(&self, ctx: ContextHandle, geom: GeomHandle) -> Ternary;

    /// Destroy one geometry.
    fn geom_destroy(&self, ctx: ContextHandle, geom: GeomHandle);

    /// Serialize a geometry to WKT.
    fn geom_to_wkt(&self, ctx: ContextHandle, geom: GeomHandle) -> Option<String>;

    /// `a` lies in `b` and their interiors intersect.
    fn within(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Ternary;

    /// `a` and `b` share at least one point.
    fn intersects(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Ternary;

    /// Minimum Euclidean distance, written to `out` on success.
    fn distance(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle, out: &mut f64) -> bool;

    /// Buffer by `width` (negative contracts).
    fn buffer(&self, ctx: ContextHandle, geom: GeomHandle, width: f64) -> Option<GeomHandle>;

    /// Douglas-Peucker simplification.
    fn simplify(&self, ctx: ContextHandle, geom: GeomHandle, tolerance: f64)
        -> Option<GeomHandle>;

    /// Point-set union.
    fn union(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle) -> Option<GeomHandle>;

    /// Point-set difference `a - b`.
    fn difference(&self, ctx: ContextHandle, a: GeomHandle, b: GeomHandle)
        -> Option<GeomHandle>;
}
