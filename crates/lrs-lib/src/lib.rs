//! LRS Library - Measure Algebra for Linear Referencing
//!
//! This library clips, splits, merges, offsets and re-measures linear features addressed by a
//! scalar measure (distance along route). Inputs and outputs are [`lrs_geometry::Geometry`]
//! values whose vertices carry an optional measure (M).
//!
//! # Architecture
//!
//! - **[`pipeline`]**: Sink stages chained between a source geometry and a builder
//!   (measure reset/scale/translate, populate, validate, reverse, shift, collect)
//! - **[`LrsPoint`] / [`LrsLine`] / [`LrsMultiLine`]**: Segment model with incremental length
//!   and the per-vertex quantities used by the offset engine
//! - **[`functions`]**: Function surface over provider geometries (clip, split, merge, ...)
//! - **[`LrsEngine`]**: Facade that fills in the configured tolerance
//!
//! # Performance Characteristics
//!
//! - Every operation is a single pass over the input vertices: O(N)
//! - The offset engine does per-vertex trigonometry and may add up to three points per bend
//! - No state is shared between calls

mod clip;
mod engine;
pub mod functions;
mod line;
mod locate;
mod merge;
mod multi_line;
mod offset;
pub mod pipeline;
mod point;
mod segment;
mod split;
pub mod utils;

// Public API exports
pub use engine::{Config, LrsEngine};
pub use line::LrsLine;
pub use multi_line::LrsMultiLine;
pub use pipeline::{ShapeContext, ValidationStatus};
pub use point::LrsPoint;
pub use segment::{LrsSegment, normalize_measures};

pub use lrs_geometry::{Geometry, GeometryError};

/// Error types for LRS operations
#[derive(Debug, thiserror::Error)]
pub enum LrsError {
    #[error("{operation} expects {expected}, found {found}")]
    TypeMismatch {
        operation: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("SRID mismatch: {left} != {right}")]
    SridMismatch { left: i32, right: i32 },

    #[error("Measure {measure} is outside of the range [{start}, {end}]")]
    MeasureOutOfRange { measure: f64, start: f64, end: f64 },

    #[error("Measure not defined: {0}")]
    MeasureNotDefined(String),

    #[error("Measure not linear: {0}")]
    MeasureNotLinear(String),

    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, LrsError>;

impl LrsError {
    /// Type mismatch for an operation receiving an unsupported geometry
    pub(crate) fn type_mismatch(
        operation: &'static str,
        expected: &'static str,
        found: &Geometry,
    ) -> Self {
        LrsError::TypeMismatch {
            operation,
            expected,
            found: found.kind().as_str(),
        }
    }
}

/// Fail unless both geometries share a spatial reference
pub(crate) fn require_same_srid(left: &Geometry, right: &Geometry) -> Result<()> {
    if left.srid() != right.srid() {
        return Err(LrsError::SridMismatch {
            left: left.srid(),
            right: right.srid(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Install a test subscriber honouring `RUST_LOG`; repeated calls are ignored
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
