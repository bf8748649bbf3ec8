//! LRS Geometry - Measured Geometry Primitives
//!
//! This crate provides the geometry value consumed and produced by the linear referencing
//! engine: points, linestrings, multilinestrings and polygons whose vertices may carry an
//! elevation (Z) and a measure (M), tagged with an integer SRID.
//!
//! # Architecture
//!
//! - **[`Geometry`]**: Immutable geometry value with shape predicates and planar metrics
//! - **[`GeometrySink`]**: Streaming event interface (`begin_shape`, `begin_part`, `line_to`, ...)
//! - **[`GeometryBuilder`]**: Sink that assembles a [`Geometry`] from an event stream
//! - **[`wkt`]**: Extended well-known-text reader/writer (Z, M and SQL-style `NULL` ordinates)
//!
//! [`Geometry::populate`] replays an existing value as the same event stream the builder
//! accepts, so any chain of sinks can sit between a source geometry and a builder.

mod coord;
mod geometry;
mod sink;
pub mod wkt;

// Public API exports
pub use coord::{Coord, ShapeKind};
pub use geometry::{Geometry, Shape};
pub use sink::{GeometryBuilder, GeometrySink};

/// Error types for geometry parsing and construction
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("WKT parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unexpected sink event: {0}")]
    UnexpectedEvent(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn(&str, i32) -> Result<Geometry> = Geometry::from_wkt;
        let _: fn() -> GeometryBuilder = GeometryBuilder::new;
    }

    #[test]
    fn test_error_messages() {
        let err = GeometryError::Parse {
            position: 4,
            message: "expected '('".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "WKT parse error at position 4: expected '('"
        );

        let err = GeometryError::InvalidGeometry("ring is not closed".to_string());
        assert_eq!(err.to_string(), "Invalid geometry: ring is not closed");
    }
}
