//! # geosafe-engine
//!
//! Context-handle geometry engine contract and a pure-Rust implementation.
//!
//! The [`GeometryEngine`] trait models a native geometry library that is only
//! safe to call through one initialized context: every call names a
//! [`ContextHandle`], geometries are opaque [`GeomHandle`]s, and failures are
//! reported through sentinels rather than errors. [`GeoEngine`] implements the
//! contract over the `geo` algorithm crate.
//!
//! ## Example
//!
//! ```
//! use geosafe_engine::{GeoEngine, GeometryEngine, Ternary};
//!
//! let engine = GeoEngine::new();
//! let ctx = engine.init().unwrap();
//! let point = engine.geom_from_wkt(ctx, "POINT(1 1)").unwrap();
//! let square = engine
//!     .geom_from_wkt(ctx, "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))")
//!     .unwrap();
//! assert_eq!(engine.within(ctx, point, square), Ternary::True);
//! engine.finish(ctx);
//! ```

pub mod arena;
pub mod engine;
pub mod error;
pub mod geo_engine;
pub mod geometry;
pub mod handle;
pub mod stats;

pub use arena::ContextArena;
pub use engine::GeometryEngine;
pub use error::{EngineError, Result};
pub use geo_engine::GeoEngine;
pub use geometry::GeometryType;
pub use handle::{ContextHandle, GeomHandle, Ternary};
pub use stats::{EngineStats, EngineStatsSnapshot};
