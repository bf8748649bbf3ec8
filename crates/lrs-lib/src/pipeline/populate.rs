//! Measure population over arc length

use super::ShapeContext;
use crate::{LrsError, Result};
use lrs_geometry::{Coord, GeometrySink, ShapeKind};

/// Stage assigning `start + travelled / total * (end - start)` to every vertex
///
/// `total_length` is the planar length of the whole shape, known before streaming. The distance
/// travelled carries over from one member to the next (the gap between members is not counted),
/// so measures are continuous across a multi-line. The vertex closing the last member is held
/// back one event and receives exactly `end`.
#[derive(Debug)]
pub struct PopulateMeasureSink<S> {
    downstream: S,
    context: ShapeContext,
    start: f64,
    end: f64,
    total_length: f64,
    travelled: f64,
    previous: Option<Coord>,
    pending: Option<Coord>,
    part_started: bool,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<S: GeometrySink<LrsError>> PopulateMeasureSink<S> {
    pub fn new(
        downstream: S,
        context: ShapeContext,
        start: f64,
        end: f64,
        total_length: f64,
    ) -> Self {
        if total_length == 0.0 {
            tracing::warn!("Populating measures on a zero-length line, every vertex gets {start}");
        }
        Self {
            downstream,
            context,
            start,
            end,
            total_length,
            travelled: 0.0,
            previous: None,
            pending: None,
            part_started: false,
        }
    }

    pub fn into_inner(self) -> S {
        self.downstream
    }

    fn measure_at(&self, travelled: f64) -> f64 {
        if self.total_length == 0.0 {
            return self.start;
        }
        self.start + travelled / self.total_length * (self.end - self.start)
    }

    fn flush(&mut self) -> Result<()> {
        let Some(coord) = self.pending.take() else {
            return Ok(());
        };
        if self.part_started {
            self.downstream.line_to(coord)
        } else {
            self.part_started = true;
            self.downstream.begin_part(coord)
        }
    }
}

impl<S: GeometrySink<LrsError>> GeometrySink<LrsError> for PopulateMeasureSink<S> {
    fn set_srid(&mut self, srid: i32) {
        self.downstream.set_srid(srid);
    }

    fn begin_shape(&mut self, kind: ShapeKind) -> Result<()> {
        if !matches!(kind, ShapeKind::LineString | ShapeKind::MultiLineString) {
            return Err(LrsError::TypeMismatch {
                operation: "populate",
                expected: "LINESTRING or MULTILINESTRING",
                found: kind.as_str(),
            });
        }
        self.downstream.begin_shape(kind)
    }

    fn begin_part(&mut self, coord: Coord) -> Result<()> {
        self.part_started = false;
        self.previous = Some(coord);
        self.pending = Some(coord.with_m(Some(self.measure_at(self.travelled))));
        Ok(())
    }

    fn line_to(&mut self, coord: Coord) -> Result<()> {
        if let Some(previous) = self.previous {
            self.travelled += previous.distance_2d(&coord);
        }
        self.previous = Some(coord);
        self.flush()?;
        self.pending = Some(coord.with_m(Some(self.measure_at(self.travelled))));
        Ok(())
    }

    fn end_part(&mut self) -> Result<()> {
        if self.context.is_last_member() {
            let end = self.end;
            if let Some(last) = self.pending.as_mut() {
                last.m = Some(end);
            }
        }
        self.flush()?;
        self.context = self.context.advance();
        self.downstream.end_part()
    }

    fn end_shape(&mut self) -> Result<()> {
        self.downstream.end_shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrs_geometry::{Geometry, GeometryBuilder};

    fn populate(wkt: &str, start: f64, end: f64) -> Geometry {
        let geom = Geometry::from_wkt(wkt, 0).unwrap();
        let context = ShapeContext::of(&geom, "populate").unwrap();
        let mut sink =
            PopulateMeasureSink::new(GeometryBuilder::new(), context, start, end, geom.length());
        geom.populate(&mut sink).unwrap();
        sink.into_inner().finish().unwrap()
    }

    #[test]
    fn test_populate_line_over_arc_length() {
        let geom = populate("LINESTRING(0 0, 3 0, 3 4, 10 4)", 0.0, 140.0);
        let measures: Vec<f64> = geom.coords().filter_map(|c| c.m).collect();
        assert_eq!(measures.len(), 4);
        assert!((measures[0] - 0.0).abs() < f64::EPSILON);
        assert!((measures[1] - 30.0).abs() < 1e-9);
        assert!((measures[2] - 70.0).abs() < 1e-9);
        assert_eq!(measures[3], 140.0);
    }

    #[test]
    fn test_populate_multi_line_is_continuous() {
        let geom = populate("MULTILINESTRING((0 0, 5 0), (100 0, 100 5))", 10.0, 20.0);
        let measures: Vec<f64> = geom.coords().filter_map(|c| c.m).collect();
        assert_eq!(measures, vec![10.0, 15.0, 15.0, 20.0]);
    }

    #[test]
    fn test_populate_decreasing_range() {
        let geom = populate("LINESTRING(0 0, 5 0, 10 0)", 100.0, 0.0);
        let measures: Vec<f64> = geom.coords().filter_map(|c| c.m).collect();
        assert_eq!(measures, vec![100.0, 50.0, 0.0]);
    }

    #[test]
    fn test_populate_zero_length_line() {
        crate::test_support::init_tracing();
        let geom = populate("LINESTRING(1 1, 1 1)", 3.0, 9.0);
        let measures: Vec<f64> = geom.coords().filter_map(|c| c.m).collect();
        assert_eq!(measures, vec![3.0, 9.0]);
    }

    #[test]
    fn test_populate_rejects_point() {
        let geom = Geometry::from_wkt("POINT(0 0)", 0).unwrap();
        let mut sink = PopulateMeasureSink::new(
            GeometryBuilder::new(),
            ShapeContext::Line,
            0.0,
            1.0,
            0.0,
        );
        let result = geom.populate(&mut sink);
        assert!(matches!(result, Err(LrsError::TypeMismatch { .. })));
    }
}
