//! Traversal reversal

use crate::{LrsError, Result};
use lrs_geometry::{Coord, GeometrySink, ShapeKind};

/// Buffering stage re-emitting a linear shape back to front
///
/// Members come out in reverse order, each with its vertices reversed. Vertices keep their own
/// Z and M.
#[derive(Debug)]
pub struct ReverseSink<S> {
    downstream: S,
    kind: Option<ShapeKind>,
    parts: Vec<Vec<Coord>>,
}

impl<S: GeometrySink<LrsError>> ReverseSink<S> {
    pub fn new(downstream: S) -> Self {
        Self {
            downstream,
            kind: None,
            parts: Vec::new(),
        }
    }

    pub fn into_inner(self) -> S {
        self.downstream
    }

    fn current_part(&mut self) -> Result<&mut Vec<Coord>> {
        self.parts
            .last_mut()
            .ok_or_else(|| LrsError::InvalidGeometry("vertex outside of a part".to_string()))
    }
}

impl<S: GeometrySink<LrsError>> GeometrySink<LrsError> for ReverseSink<S> {
    fn set_srid(&mut self, srid: i32) {
        self.downstream.set_srid(srid);
    }

    fn begin_shape(&mut self, kind: ShapeKind) -> Result<()> {
        if !matches!(kind, ShapeKind::LineString | ShapeKind::MultiLineString) {
            return Err(LrsError::TypeMismatch {
                operation: "reverse",
                expected: "LINESTRING or MULTILINESTRING",
                found: kind.as_str(),
            });
        }
        self.kind = Some(kind);
        self.parts.clear();
        Ok(())
    }

    fn begin_part(&mut self, coord: Coord) -> Result<()> {
        self.parts.push(vec![coord]);
        Ok(())
    }

    fn line_to(&mut self, coord: Coord) -> Result<()> {
        self.current_part()?.push(coord);
        Ok(())
    }

    fn end_part(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_shape(&mut self) -> Result<()> {
        let kind = self
            .kind
            .take()
            .ok_or_else(|| LrsError::InvalidGeometry("end of a shape never begun".to_string()))?;
        self.downstream.begin_shape(kind)?;
        for part in std::mem::take(&mut self.parts).into_iter().rev() {
            let mut coords = part.into_iter().rev();
            let Some(first) = coords.next() else {
                continue;
            };
            self.downstream.begin_part(first)?;
            for coord in coords {
                self.downstream.line_to(coord)?;
            }
            self.downstream.end_part()?;
        }
        self.downstream.end_shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrs_geometry::{Geometry, GeometryBuilder};

    fn reverse(wkt: &str) -> Result<String> {
        let geom = Geometry::from_wkt(wkt, 0).unwrap();
        let mut sink = ReverseSink::new(GeometryBuilder::new());
        geom.populate(&mut sink)?;
        Ok(sink.into_inner().finish()?.to_wkt())
    }

    #[test]
    fn test_reverse_line() {
        assert_eq!(
            reverse("LINESTRING(0 0 NULL 0, 1 0 NULL 1, 2 0 NULL 2)").unwrap(),
            "LINESTRING(2 0 NULL 2, 1 0 NULL 1, 0 0 NULL 0)"
        );
    }

    #[test]
    fn test_reverse_multi_line() {
        assert_eq!(
            reverse("MULTILINESTRING((0 0, 1 0), (2 0, 3 0, 4 0))").unwrap(),
            "MULTILINESTRING((4 0, 3 0, 2 0), (1 0, 0 0))"
        );
    }

    #[test]
    fn test_reverse_rejects_point() {
        assert!(matches!(
            reverse("POINT(1 1)"),
            Err(LrsError::TypeMismatch { .. })
        ));
    }
}
