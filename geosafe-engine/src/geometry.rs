//! WKT I/O and geometry helpers used by [`GeoEngine`](crate::GeoEngine).

use crate::error::{EngineError, Result};
use geo::{BooleanOps, CoordsIter, Intersects, Simplify};
use geo_types::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Geometry type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum GeometryType {
    Point = 0,
    LineString = 1,
    Polygon = 2,
    MultiPoint = 3,
    MultiLineString = 4,
    MultiPolygon = 5,
    GeometryCollection = 6,
}

impl GeometryType {
    /// Every type, in discriminant order.
    pub const ALL: [GeometryType; 7] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
        GeometryType::GeometryCollection,
    ];

    /// Classify a geo-types Geometry.
    ///
    /// `Line`, `Rect` and `Triangle` have no WKT tag of their own and are
    /// reported as the type they serialize to.
    pub fn from_geometry(geom: &Geometry<f64>) -> Self {
        match geom {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::Line(_) | Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
                GeometryType::Polygon
            }
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
            #[allow(unreachable_patterns)]
            _ => GeometryType::GeometryCollection,
        }
    }

    /// Upper-case WKT keyword for this type.
    pub fn wkt_keyword(&self) -> &'static str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Look up a WKT keyword, ignoring ASCII case.
    pub fn from_wkt_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.wkt_keyword().eq_ignore_ascii_case(keyword))
    }

    /// Check if this is a polygonal type.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, GeometryType::Polygon | GeometryType::MultiPolygon)
    }
}

/// Parse WKT string to geo-types Geometry.
///
/// Input whose conversion would change the declared type is rejected:
/// `POINT EMPTY` has no geo-types representation other than an empty
/// MultiPoint.
pub fn parse_wkt(text: &str) -> Result<Geometry<f64>> {
    let parsed = wkt::Wkt::<f64>::from_str(text)
        .map_err(|e| EngineError::WktParse(e.to_string()))?;
    let geom =
        Geometry::try_from(parsed).map_err(|e| EngineError::WktParse(format!("{:?}", e)))?;
    if let Some(declared) = declared_type(text) {
        let actual = GeometryType::from_geometry(&geom);
        if actual != declared {
            return Err(EngineError::WktParse(format!(
                "{} input would be read as {}",
                declared.wkt_keyword(),
                actual.wkt_keyword()
            )));
        }
    }
    Ok(geom)
}

/// Type named by the leading WKT keyword.
fn declared_type(text: &str) -> Option<GeometryType> {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    GeometryType::from_wkt_keyword(&text[..end])
}

/// Serialize a geo-types Geometry to WKT.
pub fn write_wkt(geom: &Geometry<f64>) -> String {
    use wkt::ToWkt;
    geom.wkt_string()
}

/// True when every coordinate is finite.
pub fn has_finite_coords(geom: &Geometry<f64>) -> bool {
    geom.coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Human-readable variant name, for logs and errors.
pub fn kind_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
        #[allow(unreachable_patterns)]
        _ => "Geometry",
    }
}

/// View a polygonal geometry as a MultiPolygon for boolean operations.
///
/// Returns `None` for non-polygonal inputs.
pub fn to_multi_polygon(geom: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        _ => None,
    }
}

/// Collapse a single-member MultiPolygon to a Polygon.
pub fn from_multi_polygon(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        if let Some(poly) = mp.0.pop() {
            return Geometry::Polygon(poly);
        }
    }
    Geometry::MultiPolygon(mp)
}

/// Topological dimension: 0 for puntal, 1 for lineal, 2 for polygonal.
///
/// `None` for collections, which have no single dimension.
pub fn topological_dimension(geom: &Geometry<f64>) -> Option<u8> {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Some(0),
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => Some(1),
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => Some(2),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn points_of(geom: &Geometry<f64>) -> Option<Vec<Point<f64>>> {
    match geom {
        Geometry::Point(p) => Some(vec![*p]),
        Geometry::MultiPoint(mp) => Some(mp.0.clone()),
        _ => None,
    }
}

fn lines_of(geom: &Geometry<f64>) -> Option<Vec<LineString<f64>>> {
    match geom {
        Geometry::Line(l) => Some(vec![LineString::from(vec![l.start, l.end])]),
        Geometry::LineString(ls) => Some(vec![ls.clone()]),
        Geometry::MultiLineString(mls) => Some(mls.0.clone()),
        _ => None,
    }
}

fn unsupported(op: &'static str, a: &Geometry<f64>, b: &Geometry<f64>) -> EngineError {
    let offending = if topological_dimension(a).is_some() { b } else { a };
    EngineError::Unsupported {
        op,
        kind: kind_name(offending),
    }
}

/// Point-set union of two geometries of the same dimension.
///
/// Polygonal inputs go through the overlay engine. Puntal inputs merge into a
/// MultiPoint without duplicates. Lineal inputs are collected into one
/// MultiLineString without noding.
pub fn union_geometries(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    if let (Some(ma), Some(mb)) = (to_multi_polygon(a), to_multi_polygon(b)) {
        return Ok(from_multi_polygon(ma.union(&mb)));
    }
    if let (Some(mut points), Some(more)) = (points_of(a), points_of(b)) {
        points.extend(more);
        let mut merged: Vec<Point<f64>> = Vec::with_capacity(points.len());
        for p in points {
            if !merged.contains(&p) {
                merged.push(p);
            }
        }
        return Ok(Geometry::MultiPoint(MultiPoint::new(merged)));
    }
    if let (Some(mut lines), Some(more)) = (lines_of(a), lines_of(b)) {
        lines.extend(more);
        return Ok(Geometry::MultiLineString(MultiLineString::new(lines)));
    }
    Err(unsupported("union", a, b))
}

/// Point-set difference `a - b`.
///
/// Removing a lower-dimensional geometry leaves `a` unchanged. Points are
/// filtered against any `b`; lines are clipped against polygonal `b`.
pub fn difference_geometries(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    let (Some(da), Some(db)) = (topological_dimension(a), topological_dimension(b)) else {
        return Err(unsupported("difference", a, b));
    };
    if db < da {
        return Ok(a.clone());
    }
    match da {
        0 => {
            let kept = points_of(a)
                .unwrap_or_default()
                .into_iter()
                .filter(|p| !b.intersects(p))
                .collect::<Vec<_>>();
            Ok(Geometry::MultiPoint(MultiPoint::new(kept)))
        }
        1 => match (lines_of(a), to_multi_polygon(b)) {
            (Some(lines), Some(mb)) => Ok(Geometry::MultiLineString(
                mb.clip(&MultiLineString::new(lines), true),
            )),
            _ => Err(unsupported("difference", a, b)),
        },
        _ => match (to_multi_polygon(a), to_multi_polygon(b)) {
            (Some(ma), Some(mb)) => Ok(from_multi_polygon(ma.difference(&mb))),
            _ => Err(unsupported("difference", a, b)),
        },
    }
}

/// Douglas-Peucker simplification of any geometry.
///
/// Puntal geometries have nothing to simplify and are returned unchanged.
pub fn simplify_geometry(geom: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    match geom {
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify(tolerance)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(mls.simplify(tolerance)),
        Geometry::Polygon(p) => Geometry::Polygon(p.simplify(tolerance)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp.simplify(tolerance)),
        Geometry::Rect(r) => Geometry::Polygon(r.to_polygon().simplify(tolerance)),
        Geometry::Triangle(t) => Geometry::Polygon(t.to_polygon().simplify(tolerance)),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.iter().map(|g| simplify_geometry(g, tolerance)).collect(),
        )),
        // Puntal types and bare segments
        #[allow(unreachable_patterns)]
        _ => geom.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon() {
        let geom = parse_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();
        assert!(matches!(geom, Geometry::Polygon(_)));
        assert_eq!(GeometryType::from_geometry(&geom), GeometryType::Polygon);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_wkt("INVALID_GEOMETRY").is_err());
        assert!(parse_wkt("POINT(1)").is_err());
        assert!(parse_wkt("").is_err());
    }

    #[test]
    fn test_write_reparses_to_same_type() {
        let geom = parse_wkt("LINESTRING(0 0, 1 1, 2 2)").unwrap();
        let text = write_wkt(&geom);
        assert!(text.starts_with("LINESTRING"));
        assert_eq!(parse_wkt(&text).unwrap(), geom);
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(
            GeometryType::from_wkt_keyword("multipolygon"),
            Some(GeometryType::MultiPolygon)
        );
        assert_eq!(GeometryType::from_wkt_keyword("CIRCLE"), None);
        assert!(GeometryType::MultiPolygon.is_polygonal());
        assert!(!GeometryType::LineString.is_polygonal());
    }

    #[test]
    fn test_multi_polygon_conversion() {
        let poly = parse_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();
        let mp = to_multi_polygon(&poly).unwrap();
        assert_eq!(mp.0.len(), 1);
        assert!(matches!(from_multi_polygon(mp), Geometry::Polygon(_)));

        let point = parse_wkt("POINT(1 1)").unwrap();
        assert!(to_multi_polygon(&point).is_none());
    }

    #[test]
    fn test_simplify_drops_collinear_vertices() {
        let line = parse_wkt("LINESTRING(0 0, 1 1, 2 2)").unwrap();
        match simplify_geometry(&line, 0.5) {
            Geometry::LineString(ls) => assert_eq!(ls.0.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_point_empty_rejected() {
        assert!(parse_wkt("POINT EMPTY").is_err());
        assert!(parse_wkt("  point(1 2)").is_ok());
        let empty = parse_wkt("MULTIPOINT EMPTY").unwrap();
        assert_eq!(GeometryType::from_geometry(&empty), GeometryType::MultiPoint);
    }

    #[test]
    fn test_union_by_dimension() {
        let p1 = parse_wkt("POINT(0 0)").unwrap();
        let p2 = parse_wkt("MULTIPOINT((0 0),(1 1))").unwrap();
        match union_geometries(&p1, &p2).unwrap() {
            Geometry::MultiPoint(mp) => assert_eq!(mp.0.len(), 2),
            other => panic!("unexpected {:?}", other),
        }

        let l1 = parse_wkt("LINESTRING(0 0, 1 1)").unwrap();
        let l2 = parse_wkt("LINESTRING(0 1, 1 0)").unwrap();
        match union_geometries(&l1, &l2).unwrap() {
            Geometry::MultiLineString(mls) => assert_eq!(mls.0.len(), 2),
            other => panic!("unexpected {:?}", other),
        }

        let square = parse_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();
        assert!(matches!(
            union_geometries(&square, &p1),
            Err(EngineError::Unsupported { op: "union", kind: "Point" })
        ));
    }

    #[test]
    fn test_difference_by_dimension() {
        let square = parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
        let point = parse_wkt("POINT(1 1)").unwrap();
        assert_eq!(difference_geometries(&square, &point).unwrap(), square);

        let points = parse_wkt("MULTIPOINT((1 1),(5 5))").unwrap();
        match difference_geometries(&points, &square).unwrap() {
            Geometry::MultiPoint(mp) => assert_eq!(mp.0, vec![Point::new(5.0, 5.0)]),
            other => panic!("unexpected {:?}", other),
        }

        let line = parse_wkt("LINESTRING(-1 1, 3 1)").unwrap();
        match difference_geometries(&line, &square).unwrap() {
            Geometry::MultiLineString(mls) => assert_eq!(mls.0.len(), 2),
            other => panic!("unexpected {:?}", other),
        }

        let other_line = parse_wkt("LINESTRING(0 0, 1 1)").unwrap();
        assert!(difference_geometries(&line, &other_line).is_err());
    }

    #[test]
    fn test_non_finite_detection() {
        let point = Geometry::Point(geo_types::Point::new(f64::NAN, 1.0));
        assert!(!has_finite_coords(&point));
        assert!(has_finite_coords(&parse_wkt("POINT(1 2)").unwrap()));
    }
}
