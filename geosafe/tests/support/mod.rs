//! Shared test harness for geosafe integration tests.

// Each integration test crate uses a different subset of these helpers.
#![allow(dead_code)]

pub mod engine;
pub mod span_capture;

use engine::ScriptedEngine;
use geosafe::{GeoService, GeometryEngine, ServiceConfig};
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

pub const UNIT_SQUARE: &str = "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))";
pub const SQUARE_0_2: &str = "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))";
pub const SQUARE_1_3: &str = "POLYGON((1 1, 3 1, 3 3, 1 3, 1 1))";
pub const SQUARE_5_6: &str = "POLYGON((5 5, 6 5, 6 6, 5 6, 5 5))";
pub const BOWTIE: &str = "POLYGON((0 0, 2 2, 2 0, 0 2, 0 0))";

// =============================================================================
// Service constructors
// =============================================================================

/// Service over a fresh built-in engine.
pub fn service() -> GeoService {
    GeoService::new().expect("engine init")
}

/// Service over a scripted engine, returned alongside the engine for
/// failure injection and call assertions.
pub fn scripted_service() -> (Arc<ScriptedEngine>, GeoService) {
    scripted_service_with(ServiceConfig::default())
}

pub fn scripted_service_with(config: ServiceConfig) -> (Arc<ScriptedEngine>, GeoService) {
    let engine = Arc::new(ScriptedEngine::new());
    let service = GeoService::with_engine(engine.clone() as Arc<dyn GeometryEngine>, config)
        .expect("scripted engine init");
    (engine, service)
}

/// Assert two distances agree to within 1e-3.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {} +/- 0.001, got {}",
        expected,
        actual
    );
}
