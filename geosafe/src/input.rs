//! Caller-facing geometry input and the validation-only path.

use crate::config::NormalizeConfig;
use crate::error::{GeoError, Result};
use crate::normalize::geojson_to_wkt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

pub use geosafe_engine::GeometryType;

/// Geometry description accepted by the service.
///
/// Either `wkt` or `geojson` must be present. When both are, the WKT text
/// wins. An empty string counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryInput {
    /// Well-Known Text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,

    /// GeoJSON geometry object (`type` plus `coordinates`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<Value>,

    /// Spatial reference id. Carried for callers; never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srid: Option<i32>,
}

impl GeometryInput {
    /// Input from WKT text.
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            ..Self::default()
        }
    }

    /// Input from a GeoJSON geometry object.
    pub fn from_geojson(geojson: Value) -> Self {
        Self {
            geojson: Some(geojson),
            ..Self::default()
        }
    }

    /// Attach a spatial reference id.
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    /// Non-empty WKT text, if any.
    pub fn text(&self) -> Option<&str> {
        self.wkt.as_deref().filter(|t| !t.is_empty())
    }

    /// Structured input, if any.
    pub fn structured(&self) -> Option<&Value> {
        self.geojson.as_ref().filter(|v| !v.is_null())
    }

    /// The WKT text the engine should parse.
    pub fn canonical_text(&self, config: &NormalizeConfig) -> Result<Cow<'_, str>> {
        if let Some(text) = self.text() {
            return Ok(Cow::Borrowed(text));
        }
        match self.structured() {
            Some(value) => Ok(Cow::Owned(geojson_to_wkt(value, config)?)),
            None => Err(GeoError::EmptyInput("no WKT or GeoJSON provided")),
        }
    }
}

/// Structural check without touching the engine.
///
/// Text input must start with a supported WKT keyword. Structured input must
/// carry `type` and `coordinates`; nothing deeper is checked.
pub fn validate_input(input: &GeometryInput) -> Result<()> {
    let text = input.text();
    let structured = input.structured();
    if text.is_none() && structured.is_none() {
        return Err(GeoError::EmptyInput("no WKT or GeoJSON provided"));
    }
    if let Some(text) = text {
        let keyword = leading_keyword(text);
        if GeometryType::from_wkt_keyword(keyword).is_none() {
            return Err(GeoError::UnsupportedGeometryType(keyword.to_string()));
        }
    }
    if let Some(value) = structured {
        if value.get("type").is_none() {
            return Err(GeoError::MissingType);
        }
        if value.get("coordinates").is_none() {
            return Err(GeoError::MissingCoordinates);
        }
    }
    Ok(())
}

/// Leading token of a WKT string: up to `(`, whitespace or the end.
fn leading_keyword(text: &str) -> &str {
    let text = text.trim_start();
    let end = text
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(text.len());
    &text[..end]
}
