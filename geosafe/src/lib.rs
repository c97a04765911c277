//! # geosafe
//!
//! Concurrency-safe facade over a single-context geometry engine.
//!
//! A [`GeoService`] owns one engine context behind a reader/writer lock.
//! Operations share the lock; [`GeoService::teardown`] takes it exclusively,
//! so no operation ever runs against a destroyed context. Geometries returned
//! by the service ([`Geometry`]) release their engine handle on drop or on
//! explicit [`Geometry::release`], and become inert once the service is gone.
//!
//! ## Example
//!
//! ```
//! use geosafe::GeoService;
//!
//! let service = GeoService::new()?;
//! let point = service.parse_wkt("POINT(1 1)")?;
//! let square = service.parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))")?;
//! assert!(service.within(&point, &square)?);
//!
//! service.teardown();
//! assert!(service.within(&point, &square).is_err());
//! # Ok::<(), geosafe::GeoError>(())
//! ```
//!
//! GeoJSON input goes through the same entry point:
//!
//! ```
//! use geosafe::{GeoService, GeometryInput};
//! use serde_json::json;
//!
//! let service = GeoService::new()?;
//! let line = service.parse(&GeometryInput::from_geojson(json!({
//!     "type": "LineString",
//!     "coordinates": [[0, 0], [2, 2]]
//! })))?;
//! assert!(service.to_wkt(&line)?.starts_with("LINESTRING"));
//! # Ok::<(), geosafe::GeoError>(())
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod normalize;
pub mod service;

pub use config::{NormalizeConfig, ServiceConfig};
pub use error::{GeoError, Result};
pub use geometry::Geometry;
pub use input::{validate_input, GeometryInput, GeometryType};
pub use normalize::geojson_to_wkt;
pub use service::GeoService;

pub use geosafe_engine::{GeoEngine, GeometryEngine};
