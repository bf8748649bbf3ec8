//! Per-event coordinate rewriting stages

use crate::{LrsError, Result};
use lrs_geometry::{Coord, GeometrySink, ShapeKind};

/// Rewrite applied to every vertex measure
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeasureTransform {
    /// Clear the measure
    Reset,
    /// Multiply the measure; vertices without one stay without one
    Scale(f64),
    /// Add to the measure; a missing measure counts as 0
    Translate(f64),
}

impl MeasureTransform {
    #[inline]
    pub fn apply(&self, m: Option<f64>) -> Option<f64> {
        match *self {
            MeasureTransform::Reset => None,
            MeasureTransform::Scale(factor) => m.map(|m| m * factor),
            MeasureTransform::Translate(offset) => Some(m.unwrap_or(0.0) + offset),
        }
    }

    /// Name of the operation the transform implements
    pub fn operation(&self) -> &'static str {
        match self {
            MeasureTransform::Reset => "reset_measure",
            MeasureTransform::Scale(_) => "scale_measure",
            MeasureTransform::Translate(_) => "translate_measure",
        }
    }
}

/// Points and lines only
fn require_point_or_linear(kind: ShapeKind, operation: &'static str) -> Result<()> {
    match kind {
        ShapeKind::Polygon => Err(LrsError::TypeMismatch {
            operation,
            expected: "POINT, LINESTRING or MULTILINESTRING",
            found: kind.as_str(),
        }),
        _ => Ok(()),
    }
}

/// Stage rewriting the measure of each vertex as it passes through
#[derive(Debug)]
pub struct MeasureTransformSink<S> {
    downstream: S,
    transform: MeasureTransform,
}

impl<S: GeometrySink<LrsError>> MeasureTransformSink<S> {
    pub fn new(downstream: S, transform: MeasureTransform) -> Self {
        Self {
            downstream,
            transform,
        }
    }

    /// Release the downstream stage
    pub fn into_inner(self) -> S {
        self.downstream
    }

    #[inline]
    fn rewrite(&self, coord: Coord) -> Coord {
        coord.with_m(self.transform.apply(coord.m))
    }
}

impl<S: GeometrySink<LrsError>> GeometrySink<LrsError> for MeasureTransformSink<S> {
    fn set_srid(&mut self, srid: i32) {
        self.downstream.set_srid(srid);
    }

    fn begin_shape(&mut self, kind: ShapeKind) -> Result<()> {
        require_point_or_linear(kind, self.transform.operation())?;
        self.downstream.begin_shape(kind)
    }

    fn begin_part(&mut self, coord: Coord) -> Result<()> {
        let coord = self.rewrite(coord);
        self.downstream.begin_part(coord)
    }

    fn line_to(&mut self, coord: Coord) -> Result<()> {
        let coord = self.rewrite(coord);
        self.downstream.line_to(coord)
    }

    fn end_part(&mut self) -> Result<()> {
        self.downstream.end_part()
    }

    fn end_shape(&mut self) -> Result<()> {
        self.downstream.end_shape()
    }
}

/// Stage translating x/y of every vertex; Z and M pass through unchanged
#[derive(Debug)]
pub struct ShiftSink<S> {
    downstream: S,
    dx: f64,
    dy: f64,
}

impl<S: GeometrySink<LrsError>> ShiftSink<S> {
    pub fn new(downstream: S, dx: f64, dy: f64) -> Self {
        Self { downstream, dx, dy }
    }

    pub fn into_inner(self) -> S {
        self.downstream
    }

    #[inline]
    fn shift(&self, coord: Coord) -> Coord {
        Coord {
            x: coord.x + self.dx,
            y: coord.y + self.dy,
            ..coord
        }
    }
}

impl<S: GeometrySink<LrsError>> GeometrySink<LrsError> for ShiftSink<S> {
    fn set_srid(&mut self, srid: i32) {
        self.downstream.set_srid(srid);
    }

    fn begin_shape(&mut self, kind: ShapeKind) -> Result<()> {
        require_point_or_linear(kind, "shift_geometry")?;
        self.downstream.begin_shape(kind)
    }

    fn begin_part(&mut self, coord: Coord) -> Result<()> {
        let coord = self.shift(coord);
        self.downstream.begin_part(coord)
    }

    fn line_to(&mut self, coord: Coord) -> Result<()> {
        let coord = self.shift(coord);
        self.downstream.line_to(coord)
    }

    fn end_part(&mut self) -> Result<()> {
        self.downstream.end_part()
    }

    fn end_shape(&mut self) -> Result<()> {
        self.downstream.end_shape()
    }
}
