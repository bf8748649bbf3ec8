//! Geometry value type
//!
//! [`Geometry`] pairs a [`Shape`] with its SRID. It is immutable once built: transformations
//! go through [`Geometry::populate`] into a chain of sinks ending in a
//! [`GeometryBuilder`](crate::GeometryBuilder).

use crate::{Coord, GeometryError, GeometrySink, Result, ShapeKind, wkt};
use geo::{Distance, Euclidean};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The vertex layout of a geometry
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    /// A single vertex, `None` for `POINT EMPTY`
    Point(Option<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    /// Exterior ring first, then interior rings
    Polygon(Vec<Vec<Coord>>),
}

/// A measured 2-D geometry with a spatial reference id
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    shape: Shape,
    srid: i32,
}

impl Geometry {
    /// Create a geometry from a shape and SRID
    pub fn new(shape: Shape, srid: i32) -> Self {
        Self { shape, srid }
    }

    /// Create a point geometry
    pub fn point(coord: Coord, srid: i32) -> Self {
        Self::new(Shape::Point(Some(coord)), srid)
    }

    /// Create a linestring geometry
    pub fn line_string(coords: Vec<Coord>, srid: i32) -> Self {
        Self::new(Shape::LineString(coords), srid)
    }

    /// Create a multilinestring geometry
    pub fn multi_line_string(lines: Vec<Vec<Coord>>, srid: i32) -> Self {
        Self::new(Shape::MultiLineString(lines), srid)
    }

    /// Parse extended WKT (see [`wkt`]) with the given SRID
    pub fn from_wkt(text: &str, srid: i32) -> Result<Self> {
        let shape = wkt::parse(text)
            .inspect_err(|err| tracing::debug!("Rejected WKT input: {err}"))?;
        Ok(Self::new(shape, srid))
    }

    /// Serialize as extended WKT
    pub fn to_wkt(&self) -> String {
        wkt::write(&self.shape)
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Return a copy with a different SRID
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self.shape {
            Shape::Point(_) => ShapeKind::Point,
            Shape::LineString(_) => ShapeKind::LineString,
            Shape::MultiLineString(_) => ShapeKind::MultiLineString,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        matches!(self.shape, Shape::Point(_))
    }

    #[inline]
    pub fn is_line_string(&self) -> bool {
        matches!(self.shape, Shape::LineString(_))
    }

    #[inline]
    pub fn is_multi_line_string(&self) -> bool {
        matches!(self.shape, Shape::MultiLineString(_))
    }

    #[inline]
    pub fn is_polygon(&self) -> bool {
        matches!(self.shape, Shape::Polygon(_))
    }

    /// True when the geometry has no vertices
    pub fn is_empty(&self) -> bool {
        self.num_points() == 0
    }

    /// Structural validity: lines need two vertices, polygon rings must be closed with four
    pub fn is_valid(&self) -> bool {
        match &self.shape {
            Shape::Point(coord) => coord.is_some(),
            Shape::LineString(coords) => coords.len() >= 2,
            Shape::MultiLineString(lines) => {
                !lines.is_empty() && lines.iter().all(|line| line.len() >= 2)
            }
            Shape::Polygon(rings) => {
                !rings.is_empty()
                    && rings.iter().all(|ring| {
                        ring.len() >= 4
                            && match (ring.first(), ring.last()) {
                                (Some(first), Some(last)) => first.x == last.x && first.y == last.y,
                                _ => false,
                            }
                    })
            }
        }
    }

    /// Iterate over every vertex in traversal order
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coord> + '_> {
        match &self.shape {
            Shape::Point(coord) => Box::new(coord.iter()),
            Shape::LineString(coords) => Box::new(coords.iter()),
            Shape::MultiLineString(parts) | Shape::Polygon(parts) => {
                Box::new(parts.iter().flatten())
            }
        }
    }

    /// Total number of vertices
    pub fn num_points(&self) -> usize {
        match &self.shape {
            Shape::Point(coord) => usize::from(coord.is_some()),
            Shape::LineString(coords) => coords.len(),
            Shape::MultiLineString(parts) | Shape::Polygon(parts) => {
                parts.iter().map(Vec::len).sum()
            }
        }
    }

    /// Number of member geometries (1 for single shapes, 0 when empty)
    pub fn num_geometries(&self) -> usize {
        match &self.shape {
            Shape::MultiLineString(lines) => lines.len(),
            _ if self.is_empty() => 0,
            _ => 1,
        }
    }

    /// Member geometry by 1-based index; single shapes return themselves at index 1
    pub fn geometry_n(&self, index: usize) -> Option<Geometry> {
        match &self.shape {
            Shape::MultiLineString(lines) => index
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .map(|line| Geometry::line_string(line.clone(), self.srid)),
            _ if index == 1 && !self.is_empty() => Some(self.clone()),
            _ => None,
        }
    }

    /// Vertex by 1-based index, as a point geometry
    pub fn point_n(&self, index: usize) -> Option<Geometry> {
        let coord = self.coords().nth(index.checked_sub(1)?)?;
        Some(Geometry::point(*coord, self.srid))
    }

    /// First vertex as a point geometry
    pub fn start_point(&self) -> Option<Geometry> {
        self.point_n(1)
    }

    /// Last vertex as a point geometry
    pub fn end_point(&self) -> Option<Geometry> {
        self.coords()
            .last()
            .map(|coord| Geometry::point(*coord, self.srid))
    }

    /// First vertex coordinate
    pub fn first_coord(&self) -> Option<Coord> {
        self.coords().next().copied()
    }

    /// Last vertex coordinate
    pub fn last_coord(&self) -> Option<Coord> {
        self.coords().last().copied()
    }

    /// True when any vertex carries an elevation
    pub fn has_z(&self) -> bool {
        self.coords().any(|coord| coord.z.is_some())
    }

    /// True when any vertex carries a measure
    pub fn has_m(&self) -> bool {
        self.coords().any(|coord| coord.m.is_some())
    }

    /// Planar length: sum of 2-D segment lengths (rings included for polygons)
    pub fn length(&self) -> f64 {
        fn part_length(coords: &[Coord]) -> f64 {
            coords
                .windows(2)
                .map(|pair| pair[0].distance_2d(&pair[1]))
                .sum()
        }

        match &self.shape {
            Shape::Point(_) => 0.0,
            Shape::LineString(coords) => part_length(coords),
            Shape::MultiLineString(parts) | Shape::Polygon(parts) => {
                parts.iter().map(|part| part_length(part)).sum()
            }
        }
    }

    /// Planar minimum distance between two geometries
    pub fn distance(&self, other: &Geometry) -> Result<f64> {
        if self.is_empty() || other.is_empty() {
            return Err(GeometryError::InvalidGeometry(
                "distance is undefined for empty geometries".to_string(),
            ));
        }
        let a = self.to_geo();
        let b = other.to_geo();
        Ok(Euclidean.distance(&a, &b))
    }

    /// Convert to a `geo` geometry (Z and M are dropped)
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        fn line(coords: &[Coord]) -> geo::LineString<f64> {
            geo::LineString::from(
                coords
                    .iter()
                    .map(|coord| geo::Coord::from(*coord))
                    .collect::<Vec<_>>(),
            )
        }

        match &self.shape {
            Shape::Point(Some(coord)) => geo::Geometry::Point(geo::Point::from(*coord)),
            Shape::Point(None) => geo::Geometry::MultiPoint(geo::MultiPoint::new(Vec::new())),
            Shape::LineString(coords) => geo::Geometry::LineString(line(coords)),
            Shape::MultiLineString(parts) => geo::Geometry::MultiLineString(
                geo::MultiLineString::new(parts.iter().map(|part| line(part)).collect()),
            ),
            Shape::Polygon(rings) => {
                let mut rings = rings.iter().map(|ring| line(ring));
                let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(Vec::new()));
                geo::Geometry::Polygon(geo::Polygon::new(exterior, rings.collect()))
            }
        }
    }

    /// Replay this geometry as construction events into `sink`
    pub fn populate<E, S>(&self, sink: &mut S) -> std::result::Result<(), E>
    where
        E: From<GeometryError>,
        S: GeometrySink<E> + ?Sized,
    {
        fn part<E, S: GeometrySink<E> + ?Sized>(
            sink: &mut S,
            coords: &[Coord],
        ) -> std::result::Result<(), E> {
            let mut iter = coords.iter();
            if let Some(first) = iter.next() {
                sink.begin_part(*first)?;
                for coord in iter {
                    sink.line_to(*coord)?;
                }
                sink.end_part()?;
            }
            Ok(())
        }

        sink.set_srid(self.srid);
        sink.begin_shape(self.kind())?;
        match &self.shape {
            Shape::Point(coord) => part(sink, coord.as_slice())?,
            Shape::LineString(coords) => part(sink, coords)?,
            Shape::MultiLineString(parts) | Shape::Polygon(parts) => {
                for coords in parts {
                    part(sink, coords)?;
                }
            }
        }
        sink.end_shape()
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

impl From<geo::Point<f64>> for Coord {
    fn from(point: geo::Point<f64>) -> Self {
        Coord::xy(point.x(), point.y())
    }
}

impl From<Coord> for geo::Point<f64> {
    fn from(coord: Coord) -> Self {
        geo::Point::new(coord.x, coord.y)
    }
}
