//! Streaming geometry construction
//!
//! A [`GeometrySink`] consumes the event sequence
//! `set_srid → begin_shape → (begin_part → line_to* → end_part)* → end_shape`.
//! Sinks can be chained: a stage receives events and forwards a transformed stream to the
//! sink it owns. [`GeometryBuilder`] terminates a chain by assembling a [`Geometry`].

use crate::{Coord, Geometry, GeometryError, Result, Shape, ShapeKind};

/// Consumer of geometry construction events
///
/// The error type is generic so that downstream crates can thread their own error through a
/// chain of stages while still accepting provider errors (`E: From<GeometryError>`).
pub trait GeometrySink<E = GeometryError> {
    /// Set the spatial reference of the shape that follows
    fn set_srid(&mut self, srid: i32);

    /// Start a new shape of the given kind
    fn begin_shape(&mut self, kind: ShapeKind) -> std::result::Result<(), E>;

    /// Start a new part (point, linestring member or polygon ring) at `coord`
    fn begin_part(&mut self, coord: Coord) -> std::result::Result<(), E>;

    /// Continue the current part to `coord`
    fn line_to(&mut self, coord: Coord) -> std::result::Result<(), E>;

    /// Finish the current part
    fn end_part(&mut self) -> std::result::Result<(), E>;

    /// Finish the current shape
    fn end_shape(&mut self) -> std::result::Result<(), E>;
}

impl<E, S: GeometrySink<E> + ?Sized> GeometrySink<E> for Box<S> {
    fn set_srid(&mut self, srid: i32) {
        self.as_mut().set_srid(srid)
    }

    fn begin_shape(&mut self, kind: ShapeKind) -> std::result::Result<(), E> {
        self.as_mut().begin_shape(kind)
    }

    fn begin_part(&mut self, coord: Coord) -> std::result::Result<(), E> {
        self.as_mut().begin_part(coord)
    }

    fn line_to(&mut self, coord: Coord) -> std::result::Result<(), E> {
        self.as_mut().line_to(coord)
    }

    fn end_part(&mut self) -> std::result::Result<(), E> {
        self.as_mut().end_part()
    }

    fn end_shape(&mut self) -> std::result::Result<(), E> {
        self.as_mut().end_shape()
    }
}

/// Sink that assembles a [`Geometry`] from construction events
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    srid: i32,
    kind: Option<ShapeKind>,
    parts: Vec<Vec<Coord>>,
    current: Option<Vec<Coord>>,
    finished: Option<Geometry>,
}

impl GeometryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the geometry built by the last completed shape
    pub fn finish(self) -> Result<Geometry> {
        self.finished.ok_or_else(|| {
            GeometryError::UnexpectedEvent("builder finished before end_shape".to_string())
        })
    }

    fn require_shape(&self, event: &str) -> Result<ShapeKind> {
        self.kind
            .ok_or_else(|| GeometryError::UnexpectedEvent(format!("{event} outside of a shape")))
    }

    fn begin_shape_impl(&mut self, kind: ShapeKind) -> Result<()> {
        if self.kind.is_some() {
            return Err(GeometryError::UnexpectedEvent(
                "begin_shape while another shape is open".to_string(),
            ));
        }
        self.kind = Some(kind);
        self.parts.clear();
        self.finished = None;
        Ok(())
    }

    fn begin_part_impl(&mut self, coord: Coord) -> Result<()> {
        let kind = self.require_shape("begin_part")?;
        if self.current.is_some() {
            return Err(GeometryError::UnexpectedEvent(
                "begin_part while another part is open".to_string(),
            ));
        }
        if matches!(kind, ShapeKind::Point | ShapeKind::LineString) && !self.parts.is_empty() {
            return Err(GeometryError::UnexpectedEvent(format!(
                "{kind} accepts a single part"
            )));
        }
        self.current = Some(vec![coord]);
        Ok(())
    }

    fn line_to_impl(&mut self, coord: Coord) -> Result<()> {
        let kind = self.require_shape("line_to")?;
        if kind == ShapeKind::Point {
            return Err(GeometryError::UnexpectedEvent(
                "line_to inside a POINT".to_string(),
            ));
        }
        match self.current.as_mut() {
            Some(part) => {
                part.push(coord);
                Ok(())
            }
            None => Err(GeometryError::UnexpectedEvent(
                "line_to before begin_part".to_string(),
            )),
        }
    }

    fn end_part_impl(&mut self) -> Result<()> {
        let part = self
            .current
            .take()
            .ok_or_else(|| GeometryError::UnexpectedEvent("end_part without a part".to_string()))?;
        self.parts.push(part);
        Ok(())
    }

    fn end_shape_impl(&mut self) -> Result<()> {
        let kind = self.require_shape("end_shape")?;
        if self.current.is_some() {
            return Err(GeometryError::UnexpectedEvent(
                "end_shape with an open part".to_string(),
            ));
        }
        let mut parts = std::mem::take(&mut self.parts);
        let shape = match kind {
            ShapeKind::Point => Shape::Point(parts.pop().and_then(|part| part.first().copied())),
            ShapeKind::LineString => Shape::LineString(parts.pop().unwrap_or_default()),
            ShapeKind::MultiLineString => Shape::MultiLineString(parts),
            ShapeKind::Polygon => Shape::Polygon(parts),
        };
        self.kind = None;
        self.finished = Some(Geometry::new(shape, self.srid));
        Ok(())
    }
}

impl<E: From<GeometryError>> GeometrySink<E> for GeometryBuilder {
    fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }

    fn begin_shape(&mut self, kind: ShapeKind) -> std::result::Result<(), E> {
        Ok(self.begin_shape_impl(kind)?)
    }

    fn begin_part(&mut self, coord: Coord) -> std::result::Result<(), E> {
        Ok(self.begin_part_impl(coord)?)
    }

    fn line_to(&mut self, coord: Coord) -> std::result::Result<(), E> {
        Ok(self.line_to_impl(coord)?)
    }

    fn end_part(&mut self) -> std::result::Result<(), E> {
        Ok(self.end_part_impl()?)
    }

    fn end_shape(&mut self) -> std::result::Result<(), E> {
        Ok(self.end_shape_impl()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_linestring() {
        let mut builder = GeometryBuilder::new();
        let sink: &mut dyn GeometrySink = &mut builder;
        sink.set_srid(4326);
        sink.begin_shape(ShapeKind::LineString).unwrap();
        sink.begin_part(Coord::xym(0.0, 0.0, 0.0)).unwrap();
        sink.line_to(Coord::xym(10.0, 0.0, 10.0)).unwrap();
        sink.end_part().unwrap();
        sink.end_shape().unwrap();

        let geom = builder.finish().unwrap();
        assert_eq!(geom.srid(), 4326);
        assert_eq!(geom.kind(), ShapeKind::LineString);
        assert_eq!(geom.num_points(), 2);
    }

    #[test]
    fn test_build_empty_point() {
        let mut builder = GeometryBuilder::new();
        let sink: &mut dyn GeometrySink = &mut builder;
        sink.begin_shape(ShapeKind::Point).unwrap();
        sink.end_shape().unwrap();

        let geom = builder.finish().unwrap();
        assert!(geom.is_point());
        assert!(geom.is_empty());
    }

    #[test]
    fn test_line_to_before_begin_part_fails() {
        let mut builder = GeometryBuilder::new();
        let sink: &mut dyn GeometrySink = &mut builder;
        sink.begin_shape(ShapeKind::LineString).unwrap();
        assert!(sink.line_to(Coord::xy(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_second_part_in_linestring_fails() {
        let mut builder = GeometryBuilder::new();
        let sink: &mut dyn GeometrySink = &mut builder;
        sink.begin_shape(ShapeKind::LineString).unwrap();
        sink.begin_part(Coord::xy(0.0, 0.0)).unwrap();
        sink.line_to(Coord::xy(1.0, 0.0)).unwrap();
        sink.end_part().unwrap();
        assert!(sink.begin_part(Coord::xy(5.0, 5.0)).is_err());
    }

    #[test]
    fn test_finish_without_shape_fails() {
        let builder = GeometryBuilder::new();
        assert!(builder.finish().is_err());
    }

    #[test]
    fn test_boxed_sink_forwards_events() {
        let mut boxed: Box<dyn GeometrySink> = Box::new(GeometryBuilder::new());
        boxed.set_srid(3857);
        boxed.begin_shape(ShapeKind::Point).unwrap();
        boxed.begin_part(Coord::xy(1.0, 2.0)).unwrap();
        boxed.end_part().unwrap();
        boxed.end_shape().unwrap();
    }
}
