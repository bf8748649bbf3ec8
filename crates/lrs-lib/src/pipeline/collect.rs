//! Terminal stage loading a stream into the segment model

use crate::{LrsError, LrsLine, LrsMultiLine, LrsPoint, Result};
use lrs_geometry::{Coord, GeometrySink, ShapeKind};

/// Sink collecting linear parts into an [`LrsMultiLine`]
///
/// A LINESTRING becomes a one-member multi-line. Points and polygons are rejected, as are parts
/// with fewer than two vertices.
#[derive(Debug, Default)]
pub struct LineCollector {
    srid: i32,
    kind: Option<ShapeKind>,
    lines: Vec<LrsLine>,
    current: Option<LrsLine>,
}

impl LineCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the collected parts
    pub fn finish(self) -> LrsMultiLine {
        let mut multi = LrsMultiLine::new(self.srid);
        for line in self.lines {
            multi.add_line(line);
        }
        multi
    }
}

impl GeometrySink<LrsError> for LineCollector {
    fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }

    fn begin_shape(&mut self, kind: ShapeKind) -> Result<()> {
        if !matches!(kind, ShapeKind::LineString | ShapeKind::MultiLineString) {
            return Err(LrsError::TypeMismatch {
                operation: "load",
                expected: "LINESTRING or MULTILINESTRING",
                found: kind.as_str(),
            });
        }
        self.kind = Some(kind);
        Ok(())
    }

    fn begin_part(&mut self, coord: Coord) -> Result<()> {
        let mut line = LrsLine::new(self.srid);
        line.add_point(LrsPoint::from_coord(coord, self.srid));
        self.current = Some(line);
        Ok(())
    }

    fn line_to(&mut self, coord: Coord) -> Result<()> {
        let srid = self.srid;
        let line = self.current.as_mut().ok_or_else(|| {
            LrsError::InvalidGeometry("vertex outside of a line part".to_string())
        })?;
        line.add_point(LrsPoint::from_coord(coord, srid));
        Ok(())
    }

    fn end_part(&mut self) -> Result<()> {
        let line = self
            .current
            .take()
            .ok_or_else(|| LrsError::InvalidGeometry("end of a part never begun".to_string()))?;
        if !line.is_line() {
            return Err(LrsError::InvalidGeometry(format!(
                "line part with {} vertex, at least 2 required",
                line.len()
            )));
        }
        self.lines.push(line);
        Ok(())
    }

    fn end_shape(&mut self) -> Result<()> {
        if self.kind.take().is_none() {
            return Err(LrsError::InvalidGeometry("end of a shape never begun".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrs_geometry::Geometry;

    fn collect(wkt: &str) -> Result<LrsMultiLine> {
        let geom = Geometry::from_wkt(wkt, 31370).unwrap();
        let mut collector = LineCollector::new();
        geom.populate(&mut collector)?;
        Ok(collector.finish())
    }

    #[test]
    fn test_collect_line_string() {
        let multi = collect("LINESTRING(0 0 NULL 0, 3 4 NULL 5)").unwrap();
        assert_eq!(multi.len(), 1);
        assert_eq!(multi.srid(), 31370);
        assert!((multi.length() - 5.0).abs() < f64::EPSILON);
        assert_eq!(multi.lines()[0].points()[1].srid, 31370);
    }

    #[test]
    fn test_collect_multi_line_string() {
        let multi = collect("MULTILINESTRING((0 0, 1 0), (1 0, 2 0, 3 0))").unwrap();
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.num_points(), 5);
    }

    #[test]
    fn test_collect_rejects_single_vertex_part() {
        let result = collect("MULTILINESTRING((0 0, 1 0), (5 5))");
        assert!(matches!(result, Err(LrsError::InvalidGeometry(_))));
    }

    #[test]
    fn test_collect_rejects_polygon() {
        let result = collect("POLYGON((0 0, 1 0, 1 1, 0 0))");
        assert!(matches!(
            result,
            Err(LrsError::TypeMismatch {
                found: "POLYGON",
                ..
            })
        ));
    }
}
