//! Vertex coordinates and shape kinds

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single vertex: planar X/Y plus optional elevation and measure
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    /// Elevation, absent when the source had no Z ordinate (or `NULL`)
    pub z: Option<f64>,
    /// Measure, absent when the source had no M ordinate (or `NULL`)
    pub m: Option<f64>,
}

impl Coord {
    /// Create a new coordinate
    #[inline]
    pub fn new(x: f64, y: f64, z: Option<f64>, m: Option<f64>) -> Self {
        Self { x, y, z, m }
    }

    /// Create a 2-D coordinate without Z or M
    #[inline]
    pub fn xy(x: f64, y: f64) -> Self {
        Self::new(x, y, None, None)
    }

    /// Create a coordinate carrying only a measure
    #[inline]
    pub fn xym(x: f64, y: f64, m: f64) -> Self {
        Self::new(x, y, None, Some(m))
    }

    /// Return a copy with the measure replaced
    #[inline]
    pub fn with_m(self, m: Option<f64>) -> Self {
        Self { m, ..self }
    }

    /// Planar (2-D) Euclidean distance to another coordinate
    #[inline]
    pub fn distance_2d(&self, other: &Coord) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<Coord> for geo::Coord<f64> {
    fn from(coord: Coord) -> Self {
        geo::Coord {
            x: coord.x,
            y: coord.y,
        }
    }
}

impl From<geo::Coord<f64>> for Coord {
    fn from(coord: geo::Coord<f64>) -> Self {
        Coord::xy(coord.x, coord.y)
    }
}

/// Kind of shape announced by `begin_shape`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    Point,
    LineString,
    MultiLineString,
    Polygon,
}

impl ShapeKind {
    /// WKT keyword for this kind
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Point => "POINT",
            ShapeKind::LineString => "LINESTRING",
            ShapeKind::MultiLineString => "MULTILINESTRING",
            ShapeKind::Polygon => "POLYGON",
        }
    }

    /// Look up a kind by its (case-insensitive) WKT keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        const KINDS: [ShapeKind; 4] = [
            ShapeKind::Point,
            ShapeKind::LineString,
            ShapeKind::MultiLineString,
            ShapeKind::Polygon,
        ];
        KINDS
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_2d_ignores_z_and_m() {
        let a = Coord::new(0.0, 0.0, Some(100.0), Some(5.0));
        let b = Coord::new(3.0, 4.0, Some(-7.0), None);
        assert!((a.distance_2d(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shape_kind_keywords() {
        assert_eq!(
            ShapeKind::from_keyword("linestring"),
            Some(ShapeKind::LineString)
        );
        assert_eq!(
            ShapeKind::from_keyword("MultiLineString"),
            Some(ShapeKind::MultiLineString)
        );
        assert_eq!(ShapeKind::from_keyword("CIRCULARSTRING"), None);
        assert_eq!(ShapeKind::Polygon.to_string(), "POLYGON");
    }

    #[test]
    fn test_geo_conversion_drops_z_and_m() {
        let coord = Coord::new(1.5, 2.5, Some(3.0), Some(4.0));
        let geo_coord: geo::Coord<f64> = coord.into();
        assert_eq!(geo_coord, geo::Coord { x: 1.5, y: 2.5 });

        let back: Coord = geo_coord.into();
        assert_eq!(back, Coord::xy(1.5, 2.5));
    }
}
