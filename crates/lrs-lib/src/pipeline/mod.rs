//! Sink pipeline stages
//!
//! Every stage implements [`GeometrySink<LrsError>`](lrs_geometry::GeometrySink) and owns the
//! stage it forwards to. A chain is driven by [`Geometry::populate`] and usually terminated by
//! a [`GeometryBuilder`](lrs_geometry::GeometryBuilder):
//!
//! ```
//! use lrs_geometry::{Geometry, GeometryBuilder};
//! use lrs_lib::pipeline::{MeasureTransform, MeasureTransformSink};
//!
//! let geom = Geometry::from_wkt("LINESTRING(0 0 NULL 1, 5 0 NULL 2)", 0).unwrap();
//! let mut sink = MeasureTransformSink::new(GeometryBuilder::new(), MeasureTransform::Scale(10.0));
//! geom.populate(&mut sink).unwrap();
//! let scaled = sink.into_inner().finish().unwrap();
//! assert_eq!(scaled.to_wkt(), "LINESTRING(0 0 NULL 10, 5 0 NULL 20)");
//! ```
//!
//! Stages either rewrite each event as it passes (measure transforms, shift) or buffer and
//! decide once a part or shape is complete (populate, reverse, collect, validate). Multi-line
//! inputs call `begin_part`/`end_part` once per member; stages that care about member position
//! track it with a [`ShapeContext`].

mod collect;
mod measure;
mod populate;
mod reverse;
mod validate;

pub use collect::LineCollector;
pub use measure::{MeasureTransform, MeasureTransformSink, ShiftSink};
pub use populate::PopulateMeasureSink;
pub use reverse::ReverseSink;
pub use validate::{MeasureValidator, ValidationStatus};

use crate::{LrsError, Result};
use lrs_geometry::{Geometry, ShapeKind};

/// Position of the part currently streamed through a stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeContext {
    Line,
    MultiLine {
        member_index: usize,
        member_count: usize,
    },
}

impl ShapeContext {
    /// Context for the first part of `geom`
    ///
    /// Only linear shapes have one; anything else is a type mismatch for `operation`.
    pub fn of(geom: &Geometry, operation: &'static str) -> Result<Self> {
        match geom.kind() {
            ShapeKind::LineString => Ok(ShapeContext::Line),
            ShapeKind::MultiLineString => Ok(ShapeContext::MultiLine {
                member_index: 0,
                member_count: geom.num_geometries(),
            }),
            _ => Err(LrsError::type_mismatch(
                operation,
                "LINESTRING or MULTILINESTRING",
                geom,
            )),
        }
    }

    /// Number of parts in the shape
    pub fn member_count(&self) -> usize {
        match self {
            ShapeContext::Line => 1,
            ShapeContext::MultiLine { member_count, .. } => *member_count,
        }
    }

    /// The current part is the last of the shape
    pub fn is_last_member(&self) -> bool {
        match self {
            ShapeContext::Line => true,
            ShapeContext::MultiLine {
                member_index,
                member_count,
            } => member_index + 1 >= *member_count,
        }
    }

    /// Context of the next part
    pub fn advance(self) -> Self {
        match self {
            ShapeContext::Line => ShapeContext::Line,
            ShapeContext::MultiLine {
                member_index,
                member_count,
            } => ShapeContext::MultiLine {
                member_index: member_index + 1,
                member_count,
            },
        }
    }
}
