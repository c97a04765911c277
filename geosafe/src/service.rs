//! Context service and operation dispatcher.
//!
//! [`GeoService`] owns the single engine context. Every operation takes the
//! context lock in shared mode, checks the context is still live, leases its
//! operand handles and calls the engine. [`GeoService::teardown`] is the only
//! exclusive holder, so it waits for in-flight operations and every later
//! operation observes the torn-down state.

use crate::config::ServiceConfig;
use crate::error::{GeoError, Result};
use crate::geometry::Geometry;
use crate::input::{validate_input, GeometryInput};
use geosafe_engine::{ContextHandle, GeoEngine, GeomHandle, GeometryEngine, Ternary};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Longest WKT prefix quoted in parse errors.
const ERROR_PREVIEW_CHARS: usize = 64;

/// State shared between the service and the weak back-references held by
/// its geometries.
pub(crate) struct ServiceShared {
    pub(crate) engine: Arc<dyn GeometryEngine>,
    pub(crate) context: RwLock<Option<ContextHandle>>,
    config: ServiceConfig,
}

/// Shared access to a live context, held for the length of one operation.
type ContextLease<'a> = MappedRwLockReadGuard<'a, ContextHandle>;

/// Concurrency-safe geometry service over one engine context.
///
/// `GeoService` is `Send + Sync`; share it by reference across scoped threads
/// or wrap it in an `Arc`. Dropping the service tears the context down.
pub struct GeoService {
    shared: Arc<ServiceShared>,
}

impl GeoService {
    /// Service over a fresh [`GeoEngine`] with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ServiceConfig::default())
    }

    /// Service over a fresh [`GeoEngine`].
    pub fn with_config(config: ServiceConfig) -> Result<Self> {
        Self::with_engine(Arc::new(GeoEngine::new()), config)
    }

    /// Service over a fresh [`GeoEngine`], configured from `GEOSAFE_*`
    /// environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ServiceConfig::from_env()?)
    }

    /// Service over any engine.
    ///
    /// Fails with [`GeoError::EngineInitFailed`] if the engine cannot create
    /// a context; nothing is left allocated in that case.
    pub fn with_engine(engine: Arc<dyn GeometryEngine>, config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let ctx = engine.init().ok_or(GeoError::EngineInitFailed)?;
        tracing::debug!(?ctx, "geometry service initialized");
        Ok(Self {
            shared: Arc::new(ServiceShared {
                engine,
                context: RwLock::new(Some(ctx)),
                config,
            }),
        })
    }

    /// Destroy the engine context.
    ///
    /// Waits for in-flight operations. Idempotent. Geometries still alive
    /// afterwards become inert: operations on them fail and their release
    /// skips the engine.
    pub fn teardown(&self) {
        self.shared.teardown();
    }

    /// True until [`teardown`](Self::teardown) has run.
    pub fn is_initialized(&self) -> bool {
        self.shared.context.read().is_some()
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.shared.config
    }

    /// Parse WKT or GeoJSON input into a new geometry.
    pub fn parse(&self, input: &GeometryInput) -> Result<Geometry> {
        let _span = tracing::debug_span!("geo_parse", srid = ?input.srid).entered();
        let ctx = self.live_context()?;
        let text = input.canonical_text(&self.shared.config.normalize)?;
        let engine = &self.shared.engine;

        let handle = engine
            .geom_from_wkt(*ctx, &text)
            .ok_or_else(|| GeoError::ParseFailed(preview(&text)))?;

        if self.shared.config.validate_on_parse {
            let verdict = engine.is_valid(*ctx, handle);
            if verdict != Ternary::True {
                engine.geom_destroy(*ctx, handle);
                let reason = match verdict {
                    Ternary::Exception => "validity check failed",
                    _ => "geometry is not valid",
                };
                return Err(GeoError::InvalidGeometry(format!("{}: {}", reason, preview(&text))));
            }
        }
        Ok(self.wrap(handle))
    }

    /// Parse WKT text.
    pub fn parse_wkt(&self, wkt: &str) -> Result<Geometry> {
        self.parse(&GeometryInput::from_wkt(wkt))
    }

    /// Parse a GeoJSON geometry object.
    pub fn parse_geojson(&self, geojson: Value) -> Result<Geometry> {
        self.parse(&GeometryInput::from_geojson(geojson))
    }

    /// Serialize a geometry to WKT.
    pub fn to_wkt(&self, geom: &Geometry) -> Result<String> {
        let _span = tracing::debug_span!("geo_to_wkt").entered();
        let ctx = self.live_context()?;
        let handle = self.lease(geom)?;
        self.shared
            .engine
            .geom_to_wkt(*ctx, *handle)
            .ok_or(GeoError::ConversionFailed)
    }

    /// True if `a` lies within `b`.
    pub fn within(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        let _span = tracing::debug_span!("geo_within").entered();
        self.predicate("within", a, b, |engine, ctx, a, b| engine.within(ctx, a, b))
    }

    /// True if `a` and `b` share at least one point.
    pub fn intersects(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        let _span = tracing::debug_span!("geo_intersects").entered();
        self.predicate("intersects", a, b, |engine, ctx, a, b| {
            engine.intersects(ctx, a, b)
        })
    }

    /// Minimum distance between `a` and `b`.
    pub fn distance(&self, a: &Geometry, b: &Geometry) -> Result<f64> {
        let _span = tracing::debug_span!("geo_distance").entered();
        let ctx = self.live_context()?;
        let ha = self.lease(a)?;
        let hb = self.lease(b)?;
        let mut out = 0.0;
        if self.shared.engine.distance(*ctx, *ha, *hb, &mut out) {
            Ok(out)
        } else {
            Err(GeoError::OperationFailed("distance"))
        }
    }

    /// Buffer a geometry by `radius`. Negative radii contract polygons.
    pub fn buffer(&self, geom: &Geometry, radius: f64) -> Result<Geometry> {
        let _span = tracing::debug_span!("geo_buffer", radius).entered();
        let ctx = self.live_context()?;
        let handle = self.lease(geom)?;
        self.shared
            .engine
            .buffer(*ctx, *handle, radius)
            .map(|h| self.wrap(h))
            .ok_or(GeoError::OperationFailed("buffer"))
    }

    /// Douglas-Peucker simplification.
    pub fn simplify(&self, geom: &Geometry, tolerance: f64) -> Result<Geometry> {
        let _span = tracing::debug_span!("geo_simplify", tolerance).entered();
        let ctx = self.live_context()?;
        let handle = self.lease(geom)?;
        self.shared
            .engine
            .simplify(*ctx, *handle, tolerance)
            .map(|h| self.wrap(h))
            .ok_or(GeoError::OperationFailed("simplify"))
    }

    /// Union of all geometries, folded left to right.
    ///
    /// A single geometry is returned as-is (the same object). Entries after
    /// the first that have already been released are skipped.
    pub fn union(&self, geometries: &[Geometry]) -> Result<Geometry> {
        let _span = tracing::debug_span!("geo_union", count = geometries.len()).entered();
        let ctx = self.live_context()?;
        let (first, rest) = geometries
            .split_first()
            .ok_or(GeoError::EmptyInput("union needs at least one geometry"))?;
        let first_handle = self.lease(first)?;
        if rest.is_empty() {
            return Ok(first.clone());
        }
        if rest.iter().any(|g| !g.belongs_to(&self.shared)) {
            return Err(foreign_geometry());
        }

        let engine = &self.shared.engine;
        // Intermediate result owned by the fold, destroyed once superseded.
        let mut acc: Option<GeomHandle> = None;
        for (index, geom) in rest.iter().enumerate() {
            let Some(next) = geom.lease() else {
                tracing::trace!(index = index + 1, "released geometry skipped in union");
                continue;
            };
            let left = acc.unwrap_or(*first_handle);
            let merged = engine.union(*ctx, left, *next);
            if let Some(previous) = acc.take() {
                engine.geom_destroy(*ctx, previous);
            }
            acc = Some(merged.ok_or(GeoError::OperationFailed("union"))?);
        }

        Ok(match acc {
            Some(handle) => self.wrap(handle),
            None => first.clone(),
        })
    }

    /// Points of `a` not in `b`.
    pub fn difference(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        let _span = tracing::debug_span!("geo_difference").entered();
        let ctx = self.live_context()?;
        let ha = self.lease(a)?;
        let hb = self.lease(b)?;
        self.shared
            .engine
            .difference(*ctx, *ha, *hb)
            .map(|h| self.wrap(h))
            .ok_or(GeoError::OperationFailed("difference"))
    }

    /// Structural input check. No engine call; works after teardown.
    pub fn validate_geometry(&self, input: &GeometryInput) -> Result<()> {
        let _span = tracing::debug_span!("geo_validate").entered();
        validate_input(input)
    }

    fn live_context(&self) -> Result<ContextLease<'_>> {
        RwLockReadGuard::try_map(self.shared.context.read(), Option::as_ref)
            .map_err(|_| GeoError::EngineNotInitialized)
    }

    fn lease<'g>(&self, geom: &'g Geometry) -> Result<MappedRwLockReadGuard<'g, GeomHandle>> {
        if !geom.belongs_to(&self.shared) {
            return Err(foreign_geometry());
        }
        geom.lease()
            .ok_or_else(|| GeoError::InvalidGeometry("geometry has been released".to_string()))
    }

    fn predicate(
        &self,
        op: &'static str,
        a: &Geometry,
        b: &Geometry,
        call: impl FnOnce(&dyn GeometryEngine, ContextHandle, GeomHandle, GeomHandle) -> Ternary,
    ) -> Result<bool> {
        let ctx = self.live_context()?;
        let ha = self.lease(a)?;
        let hb = self.lease(b)?;
        match call(self.shared.engine.as_ref(), *ctx, *ha, *hb) {
            Ternary::True => Ok(true),
            Ternary::False => Ok(false),
            Ternary::Exception => Err(GeoError::OperationFailed(op)),
        }
    }

    fn wrap(&self, handle: GeomHandle) -> Geometry {
        Geometry::new(handle, &self.shared)
    }
}

impl ServiceShared {
    fn teardown(&self) {
        let mut context = self.context.write();
        if let Some(ctx) = context.take() {
            self.engine.finish(ctx);
            tracing::debug!(?ctx, "geometry service torn down");
        }
    }
}

impl Drop for GeoService {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl fmt::Debug for GeoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoService")
            .field("context", &*self.shared.context.read_recursive())
            .field("config", &self.shared.config)
            .finish()
    }
}

fn foreign_geometry() -> GeoError {
    GeoError::InvalidGeometry("geometry belongs to a different service".to_string())
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(ERROR_PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
