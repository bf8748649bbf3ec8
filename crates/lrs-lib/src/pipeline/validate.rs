//! Measure monotonicity validation

use crate::{LrsError, Result};
use lrs_geometry::{Coord, GeometrySink, ShapeKind};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of measure validation, surfaced as a stable integer code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ValidationStatus {
    Valid = 1,
    Invalid = 2,
    MeasureNotDefined = 3,
    MeasureNotLinear = 4,
}

impl ValidationStatus {
    const ALL: [ValidationStatus; 4] = [
        ValidationStatus::Valid,
        ValidationStatus::Invalid,
        ValidationStatus::MeasureNotDefined,
        ValidationStatus::MeasureNotLinear,
    ];

    #[inline]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "Valid",
            ValidationStatus::Invalid => "Invalid",
            ValidationStatus::MeasureNotDefined => "MeasureNotDefined",
            ValidationStatus::MeasureNotLinear => "MeasureNotLinear",
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        *self == ValidationStatus::Valid
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal stage checking that measures progress in a single direction
///
/// Only measured vertices take part: a geometry is `MeasureNotDefined` when no vertex carries a
/// measure, and vertices without one are skipped by the monotonicity walk. The direction is
/// fixed by the first pair of consecutive measures that differ; equal measures are allowed
/// anywhere. The previous measure carries over between members of a
/// multi-line, so a member starting below the previous member's end is also a violation. The
/// walk always visits every vertex.
#[derive(Debug, Default)]
pub struct MeasureValidator {
    vertices: usize,
    unmeasured: usize,
    previous: Option<f64>,
    direction: Option<Ordering>,
    violations: usize,
}

impl MeasureValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of everything streamed so far
    pub fn status(&self) -> ValidationStatus {
        if self.vertices == 0 {
            ValidationStatus::Invalid
        } else if self.unmeasured == self.vertices {
            ValidationStatus::MeasureNotDefined
        } else if self.violations > 0 {
            ValidationStatus::MeasureNotLinear
        } else {
            ValidationStatus::Valid
        }
    }

    fn visit(&mut self, coord: Coord) {
        self.vertices += 1;
        let Some(m) = coord.m else {
            self.unmeasured += 1;
            return;
        };
        if let Some(previous) = self.previous {
            match (m.partial_cmp(&previous), self.direction) {
                (Some(Ordering::Equal), _) => {}
                (Some(step), None) => self.direction = Some(step),
                (Some(step), Some(direction)) if step == direction => {}
                _ => {
                    tracing::debug!("Measure {m} breaks the progression after {previous}");
                    self.violations += 1;
                }
            }
        }
        self.previous = Some(m);
    }
}

impl GeometrySink<LrsError> for MeasureValidator {
    fn set_srid(&mut self, _srid: i32) {}

    fn begin_shape(&mut self, kind: ShapeKind) -> Result<()> {
        if kind == ShapeKind::Polygon {
            return Err(LrsError::TypeMismatch {
                operation: "validate",
                expected: "POINT, LINESTRING or MULTILINESTRING",
                found: kind.as_str(),
            });
        }
        Ok(())
    }

    fn begin_part(&mut self, coord: Coord) -> Result<()> {
        self.visit(coord);
        Ok(())
    }

    fn line_to(&mut self, coord: Coord) -> Result<()> {
        self.visit(coord);
        Ok(())
    }

    fn end_part(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_shape(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrs_geometry::Geometry;

    fn validate(wkt: &str) -> ValidationStatus {
        let geom = Geometry::from_wkt(wkt, 0).unwrap();
        let mut validator = MeasureValidator::new();
        geom.populate(&mut validator).unwrap();
        validator.status()
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ValidationStatus::Valid.code(), 1);
        assert_eq!(ValidationStatus::Invalid.code(), 2);
        assert_eq!(ValidationStatus::MeasureNotDefined.code(), 3);
        assert_eq!(ValidationStatus::MeasureNotLinear.code(), 4);
        for status in ValidationStatus::ALL {
            assert_eq!(ValidationStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ValidationStatus::from_code(0), None);
        assert_eq!(ValidationStatus::MeasureNotLinear.to_string(), "MeasureNotLinear");
    }

    #[test]
    fn test_increasing_and_decreasing_are_valid() {
        assert_eq!(
            validate("LINESTRING(0 0 NULL 0, 1 0 NULL 1, 2 0 NULL 1, 3 0 NULL 4)"),
            ValidationStatus::Valid
        );
        assert_eq!(
            validate("LINESTRING(0 0 NULL 9, 1 0 NULL 5, 2 0 NULL 0)"),
            ValidationStatus::Valid
        );
    }

    #[test]
    fn test_direction_change_is_not_linear() {
        assert_eq!(
            validate("LINESTRING(0 0 NULL 0, 1 0 NULL 1, 2 0 NULL 2, 3 0 NULL 1.5)"),
            ValidationStatus::MeasureNotLinear
        );
    }

    #[test]
    fn test_missing_measures() {
        assert_eq!(
            validate("LINESTRING(0 0, 1 0)"),
            ValidationStatus::MeasureNotDefined
        );
        assert_eq!(
            validate("LINESTRING(0 0 NULL NULL, 1 0 NULL NULL, 2 0 NULL NULL)"),
            ValidationStatus::MeasureNotDefined
        );
    }

    #[test]
    fn test_unmeasured_vertices_are_skipped() {
        assert_eq!(
            validate("LINESTRING(0 0 NULL 0, 1 0 NULL NULL, 2 0 NULL 2, 3 0 NULL 3)"),
            ValidationStatus::Valid
        );
        assert_eq!(
            validate("LINESTRING(0 0 NULL NULL, 1 0 NULL 4, 2 0 NULL NULL, 3 0 NULL 1)"),
            ValidationStatus::Valid
        );
        assert_eq!(
            validate("LINESTRING(0 0 NULL 0, 1 0 NULL 5, 2 0 NULL NULL, 3 0 NULL 2)"),
            ValidationStatus::MeasureNotLinear
        );
    }

    #[test]
    fn test_checks_across_members() {
        assert_eq!(
            validate("MULTILINESTRING((0 0 NULL 0, 1 0 NULL 1), (1 0 NULL 1, 2 0 NULL 2))"),
            ValidationStatus::Valid
        );
        assert_eq!(
            validate("MULTILINESTRING((0 0 NULL 0, 1 0 NULL 5), (1 0 NULL 2, 2 0 NULL 6))"),
            ValidationStatus::MeasureNotLinear
        );
    }

    #[test]
    fn test_point_and_empty() {
        assert_eq!(validate("POINT(1 1 NULL 3)"), ValidationStatus::Valid);
        assert_eq!(validate("POINT(1 1)"), ValidationStatus::MeasureNotDefined);
        assert_eq!(validate("LINESTRING EMPTY"), ValidationStatus::Invalid);
    }

    #[test]
    fn test_polygon_is_rejected() {
        let geom = Geometry::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 0))", 0).unwrap();
        let mut validator = MeasureValidator::new();
        assert!(matches!(
            geom.populate(&mut validator),
            Err(LrsError::TypeMismatch { .. })
        ));
    }
}
