//! GeoJSON to WKT normalization.
//!
//! Converts the structured (GeoJSON-like) input shape into the WKT text the
//! engine parses. Supports `Point`, `LineString` and `Polygon` (outer ring
//! only). No engine access.
//!
//! A vertex is an array whose first two elements are JSON numbers; further
//! elements (elevation, measures) are ignored. Malformed vertices inside a
//! LineString or Polygon ring are dropped with a warning unless
//! [`NormalizeConfig::strict_coordinates`] is set.

use crate::config::NormalizeConfig;
use crate::error::{GeoError, Result};
use serde_json::Value;
use std::fmt::Write;

/// Minimum entries in a closed ring (three corners plus the closing vertex).
pub const MIN_RING_ENTRIES: usize = 4;

/// Convert a GeoJSON geometry object to WKT.
pub fn geojson_to_wkt(value: &Value, config: &NormalizeConfig) -> Result<String> {
    let type_name = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(GeoError::MissingType)?;
    let coordinates = match value.get("coordinates") {
        None | Some(Value::Null) => return Err(GeoError::MissingCoordinates),
        Some(c) => c,
    };

    match type_name {
        "Point" => point_wkt(coordinates, config),
        "LineString" => line_string_wkt(coordinates, config),
        "Polygon" => polygon_wkt(coordinates, config),
        other => Err(GeoError::UnsupportedGeometryType(other.to_string())),
    }
}

fn point_wkt(coordinates: &Value, config: &NormalizeConfig) -> Result<String> {
    let (x, y) = vertex(coordinates).ok_or_else(|| {
        GeoError::invalid_coordinates("Point", "expected [x, y] with numeric members")
    })?;
    let mut out = String::from("POINT(");
    push_vertex(&mut out, x, y, config.precision);
    out.push(')');
    Ok(out)
}

fn line_string_wkt(coordinates: &Value, config: &NormalizeConfig) -> Result<String> {
    let entries = coordinates
        .as_array()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| GeoError::invalid_coordinates("LineString", "expected a non-empty array"))?;
    let body = vertex_list("LineString", entries, config)?;
    Ok(format!("LINESTRING({})", body))
}

fn polygon_wkt(coordinates: &Value, config: &NormalizeConfig) -> Result<String> {
    let rings = coordinates
        .as_array()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| GeoError::invalid_coordinates("Polygon", "expected a non-empty array of rings"))?;
    if rings.len() > 1 {
        tracing::debug!(holes = rings.len() - 1, "polygon holes dropped during normalization");
    }
    let outer = rings
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| GeoError::invalid_coordinates("Polygon", "outer ring must be an array"))?;
    if outer.len() < MIN_RING_ENTRIES {
        return Err(GeoError::invalid_coordinates(
            "Polygon",
            format!(
                "outer ring needs at least {} positions, got {}",
                MIN_RING_ENTRIES,
                outer.len()
            ),
        ));
    }
    let body = vertex_list("Polygon", outer, config)?;
    Ok(format!("POLYGON(({}))", body))
}

/// Comma-separated vertices, applying the malformed-vertex policy.
fn vertex_list(
    geometry_type: &'static str,
    entries: &[Value],
    config: &NormalizeConfig,
) -> Result<String> {
    let mut out = String::new();
    let mut kept = 0usize;
    for (index, entry) in entries.iter().enumerate() {
        let Some((x, y)) = vertex(entry) else {
            if config.strict_coordinates {
                return Err(GeoError::invalid_coordinates(
                    geometry_type,
                    format!("malformed position at index {}", index),
                ));
            }
            tracing::warn!(geometry_type, index, "malformed GeoJSON position omitted");
            continue;
        };
        if kept > 0 {
            out.push_str(", ");
        }
        push_vertex(&mut out, x, y, config.precision);
        kept += 1;
    }
    if kept == 0 {
        return Err(GeoError::invalid_coordinates(geometry_type, "no usable positions"));
    }
    Ok(out)
}

fn vertex(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [x, y, ..] => Some((x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

fn push_vertex(out: &mut String, x: f64, y: f64, precision: usize) {
    // Writing to a String cannot fail.
    let _ = write!(out, "{:.*} {:.*}", precision, x, precision, y);
}
