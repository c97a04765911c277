//! Error types for the geometry service.

use thiserror::Error;

/// Geometry service errors.
#[derive(Error, Debug)]
pub enum GeoError {
    /// The engine returned no context.
    #[error("Geometry engine initialization failed")]
    EngineInitFailed,

    /// The service has been torn down (or never came up).
    #[error("Geometry engine not initialized")]
    EngineNotInitialized,

    /// Released, foreign or structurally invalid geometry.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Nothing to work on.
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Structured input without a `type` member.
    #[error("GeoJSON input is missing 'type'")]
    MissingType,

    /// Structured input without a `coordinates` member.
    #[error("GeoJSON input is missing 'coordinates'")]
    MissingCoordinates,

    /// Geometry type outside the supported set.
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    /// Coordinates could not be converted for the named geometry type.
    #[error("Invalid {geometry_type} coordinates: {reason}")]
    InvalidCoordinates {
        geometry_type: &'static str,
        reason: String,
    },

    /// The engine rejected the WKT text.
    #[error("Failed to parse geometry: {0}")]
    ParseFailed(String),

    /// The engine could not serialize a geometry.
    #[error("Failed to convert geometry to WKT")]
    ConversionFailed,

    /// An engine operation reported failure.
    #[error("Geometry operation failed: {0}")]
    OperationFailed(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GeoError {
    pub(crate) fn invalid_coordinates(geometry_type: &'static str, reason: impl Into<String>) -> Self {
        GeoError::InvalidCoordinates {
            geometry_type,
            reason: reason.into(),
        }
    }
}

/// Result type for geometry service operations.
pub type Result<T> = std::result::Result<T, GeoError>;
