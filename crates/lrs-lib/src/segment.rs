//! Segment model: the point / line / multi-line value an LRS operation works on

use crate::pipeline::LineCollector;
use crate::{LrsError, LrsLine, LrsMultiLine, LrsPoint, Result};
use lrs_geometry::{Coord, Geometry, GeometryBuilder, GeometrySink, Shape, ShapeKind};

/// Result or input of an LRS operation in the segment model
#[derive(Clone, Debug)]
pub enum LrsSegment {
    Point(LrsPoint),
    Line(LrsLine),
    MultiLine(LrsMultiLine),
}

impl LrsSegment {
    /// Load a LINESTRING or MULTILINESTRING into the segment model
    ///
    /// The geometry is normalized first (see [`normalize_measures`]).
    pub fn from_geometry(geom: &Geometry) -> Result<Self> {
        let geom = normalize_measures(geom);
        if let Shape::Point(Some(coord)) = geom.shape() {
            return Ok(LrsSegment::Point(LrsPoint::from_coord(*coord, geom.srid())));
        }
        let mut collector = LineCollector::new();
        geom.populate(&mut collector)?;
        let multi = collector.finish();
        Ok(if geom.is_line_string() {
            LrsSegment::from_lines(multi.into_lines(), geom.srid())
        } else {
            LrsSegment::MultiLine(multi)
        })
    }

    /// Collapse a list of lines: one line stays a line, several become a multi-line
    ///
    /// Lines with fewer than two points are dropped; when nothing else is left the first
    /// single point found becomes a point. Returns `None` when every line is empty.
    pub fn collapse(lines: Vec<LrsLine>, srid: i32) -> Option<Self> {
        let (proper, points): (Vec<LrsLine>, Vec<LrsLine>) =
            lines.into_iter().partition(LrsLine::is_line);
        match proper.len() {
            0 => points
                .iter()
                .find_map(|line| line.start_point().copied())
                .map(LrsSegment::Point),
            1 => proper.into_iter().next().map(LrsSegment::Line),
            _ => {
                let mut multi = LrsMultiLine::new(srid);
                for line in proper {
                    multi.add_line(line);
                }
                Some(LrsSegment::MultiLine(multi))
            }
        }
    }

    fn from_lines(mut lines: Vec<LrsLine>, srid: i32) -> Self {
        match lines.pop() {
            Some(line) if lines.is_empty() => LrsSegment::Line(line),
            Some(line) => {
                lines.push(line);
                let mut multi = LrsMultiLine::new(srid);
                for line in lines {
                    multi.add_line(line);
                }
                LrsSegment::MultiLine(multi)
            }
            None => LrsSegment::MultiLine(LrsMultiLine::new(srid)),
        }
    }

    pub fn srid(&self) -> i32 {
        match self {
            LrsSegment::Point(point) => point.srid,
            LrsSegment::Line(line) => line.srid(),
            LrsSegment::MultiLine(multi) => multi.srid(),
        }
    }

    /// Measure at the start of the traversal, 0 when absent
    pub fn start_measure(&self) -> f64 {
        match self {
            LrsSegment::Point(point) => point.measure_or_zero(),
            LrsSegment::Line(line) => line.start_measure(),
            LrsSegment::MultiLine(multi) => multi.start_measure(),
        }
    }

    /// Measure at the end of the traversal, 0 when absent
    pub fn end_measure(&self) -> f64 {
        match self {
            LrsSegment::Point(point) => point.measure_or_zero(),
            LrsSegment::Line(line) => line.end_measure(),
            LrsSegment::MultiLine(multi) => multi.end_measure(),
        }
    }

    /// Member lines in traversal order (empty for a point)
    pub fn lines(&self) -> &[LrsLine] {
        match self {
            LrsSegment::Point(_) => &[],
            LrsSegment::Line(line) => std::slice::from_ref(line),
            LrsSegment::MultiLine(multi) => multi.lines(),
        }
    }

    /// Give every unmeasured vertex a measure from the measured vertices around it
    ///
    /// A vertex between two measured ones is interpolated over the planar distance travelled
    /// (gaps between members are not counted); vertices before the first or after the last
    /// measured one take that measure. Nothing changes when no vertex, or every vertex, carries
    /// a measure.
    pub(crate) fn fill_missing_measures(&mut self) {
        let lines: &mut [LrsLine] = match self {
            LrsSegment::Point(_) => return,
            LrsSegment::Line(line) => std::slice::from_mut(line),
            LrsSegment::MultiLine(multi) => multi.lines_mut(),
        };

        let mut travelled: Vec<f64> = Vec::new();
        let mut measures: Vec<Option<f64>> = Vec::new();
        for line in lines.iter() {
            let mut distance = travelled.last().copied().unwrap_or(0.0);
            for (i, point) in line.points().iter().enumerate() {
                if let Some(previous) = i.checked_sub(1).map(|j| &line.points()[j]) {
                    distance += previous.distance_to(point);
                }
                travelled.push(distance);
                measures.push(point.m);
            }
        }

        let known: Vec<(usize, f64)> = measures
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|m| (i, m)))
            .collect();
        if known.is_empty() || known.len() == measures.len() {
            return;
        }
        tracing::debug!(
            "Filling {} unmeasured vertices from {} measured ones",
            measures.len() - known.len(),
            known.len()
        );

        let filled: Vec<f64> = measures
            .iter()
            .enumerate()
            .map(|(i, m)| {
                if let Some(m) = m {
                    return *m;
                }
                let next = known.partition_point(|&(k, _)| k < i);
                match (next.checked_sub(1).map(|j| known[j]), known.get(next)) {
                    (Some((a, ma)), Some(&(b, mb))) => {
                        let span = travelled[b] - travelled[a];
                        let fraction = if span == 0.0 {
                            0.0
                        } else {
                            (travelled[i] - travelled[a]) / span
                        };
                        ma + fraction * (mb - ma)
                    }
                    (Some((_, ma)), None) => ma,
                    (None, Some(&(_, mb))) => mb,
                    (None, None) => 0.0,
                }
            })
            .collect();

        let mut values = filled.into_iter();
        for line in lines.iter_mut() {
            for point in line.points_mut() {
                if let Some(m) = values.next() {
                    point.m = Some(m);
                }
            }
        }
    }

    /// Emit as a complete shape
    pub fn write_to<S: GeometrySink<LrsError> + ?Sized>(&self, sink: &mut S) -> Result<()> {
        match self {
            LrsSegment::Point(point) => {
                sink.set_srid(point.srid);
                sink.begin_shape(ShapeKind::Point)?;
                sink.begin_part(point.to_coord())?;
                sink.end_part()?;
                sink.end_shape()
            }
            LrsSegment::Line(line) => line.write_to(sink),
            LrsSegment::MultiLine(multi) => multi.write_to(sink),
        }
    }

    /// Convert to a provider geometry through the builder
    pub fn to_geometry(&self) -> Result<Geometry> {
        let mut builder = GeometryBuilder::new();
        self.write_to(&mut builder)?;
        Ok(builder.finish()?)
    }
}

/// Reinterpret elevation as measure for geometries that carry no measure at all
///
/// A "Z" ordinate on a geometry without any M is the LRS convention for storing measures, so
/// every vertex's Z moves to M and Z is cleared. Geometries with at least one measure are
/// returned unchanged.
pub fn normalize_measures(geom: &Geometry) -> Geometry {
    if geom.has_m() || !geom.has_z() {
        return geom.clone();
    }
    let convert = |coords: &[Coord]| -> Vec<Coord> {
        coords
            .iter()
            .map(|c| Coord::new(c.x, c.y, None, c.z))
            .collect()
    };
    let shape = match geom.shape() {
        Shape::Point(coord) => Shape::Point(coord.map(|c| Coord::new(c.x, c.y, None, c.z))),
        Shape::LineString(coords) => Shape::LineString(convert(coords)),
        Shape::MultiLineString(parts) => {
            Shape::MultiLineString(parts.iter().map(|part| convert(part)).collect())
        }
        Shape::Polygon(rings) => Shape::Polygon(rings.iter().map(|ring| convert(ring)).collect()),
    };
    Geometry::new(shape, geom.srid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom(wkt: &str) -> Geometry {
        Geometry::from_wkt(wkt, 0).unwrap()
    }

    #[test]
    fn test_normalize_moves_z_to_m() {
        let normalized = normalize_measures(&geom("LINESTRING(0 0 5, 10 0 15)"));
        assert_eq!(normalized.to_wkt(), "LINESTRING(0 0 NULL 5, 10 0 NULL 15)");
    }

    #[test]
    fn test_normalize_keeps_explicit_measures() {
        let original = geom("LINESTRING(0 0 1 5, 10 0 1 NULL)");
        assert_eq!(normalize_measures(&original), original);
    }

    #[test]
    fn test_from_geometry_line_and_multi() {
        let line = LrsSegment::from_geometry(&geom("LINESTRING(0 0 NULL 0, 5 0 NULL 5)")).unwrap();
        assert!(matches!(line, LrsSegment::Line(_)));
        assert_eq!(line.end_measure(), 5.0);

        let multi = LrsSegment::from_geometry(&geom(
            "MULTILINESTRING((0 0 NULL 0, 5 0 NULL 5), (5 0 NULL 5, 5 5 NULL 10))",
        ))
        .unwrap();
        assert_eq!(multi.lines().len(), 2);
        assert_eq!(multi.end_measure(), 10.0);
    }

    #[test]
    fn test_from_geometry_rejects_polygon() {
        let result = LrsSegment::from_geometry(&geom("POLYGON((0 0, 1 0, 1 1, 0 0))"));
        assert!(matches!(result, Err(LrsError::TypeMismatch { .. })));
    }

    #[test]
    fn test_collapse() {
        let a = LrsLine::from_points([LrsPoint::from_xyz(0.0, 0.0, 0.0, 0)], 0);
        let collapsed = LrsSegment::collapse(vec![a.clone()], 0).unwrap();
        assert!(matches!(collapsed, LrsSegment::Point(_)));

        let b = LrsLine::from_points(
            [
                LrsPoint::from_xyz(0.0, 0.0, 0.0, 0),
                LrsPoint::from_xyz(1.0, 0.0, 1.0, 0),
            ],
            0,
        );
        let collapsed = LrsSegment::collapse(vec![a, b.clone()], 0).unwrap();
        assert!(matches!(collapsed, LrsSegment::Line(_)));

        let collapsed = LrsSegment::collapse(vec![b.clone(), b], 0).unwrap();
        assert!(matches!(collapsed, LrsSegment::MultiLine(_)));

        assert!(LrsSegment::collapse(Vec::new(), 0).is_none());
    }

    #[test]
    fn test_fill_missing_measures() {
        let mut line = LrsSegment::from_geometry(&geom(
            "LINESTRING(0 0 NULL NULL, 1 0 NULL 2, 2 0 NULL NULL, 5 0 NULL 10, 6 0 NULL NULL)",
        ))
        .unwrap();
        line.fill_missing_measures();
        let measures: Vec<_> = line.lines()[0].points().iter().map(|p| p.m).collect();
        assert_eq!(
            measures,
            vec![Some(2.0), Some(2.0), Some(4.0), Some(10.0), Some(10.0)]
        );
    }

    #[test]
    fn test_fill_missing_measures_across_members() {
        let mut multi = LrsSegment::from_geometry(&geom(
            "MULTILINESTRING((0 0 NULL 0, 2 0 NULL NULL), (50 0 NULL NULL, 52 0 NULL 8))",
        ))
        .unwrap();
        multi.fill_missing_measures();
        let measures: Vec<_> = multi
            .lines()
            .iter()
            .flat_map(|line| line.points().iter().map(|p| p.m))
            .collect();
        assert_eq!(measures, vec![Some(0.0), Some(4.0), Some(4.0), Some(8.0)]);
    }

    #[test]
    fn test_to_geometry_point() {
        let point = LrsSegment::Point(LrsPoint::from_xyz(5.0, 0.0, 5.0, 0));
        assert_eq!(point.to_geometry().unwrap().to_wkt(), "POINT(5 0 NULL 5)");
    }

    #[test]
    fn test_to_geometry_keeps_srid() {
        let geom = Geometry::from_wkt(
            "MULTILINESTRING((0 0 NULL 0, 1 0 NULL 1), (2 0 NULL 1, 3 0 NULL 2))",
            4326,
        )
        .unwrap();
        let segment = LrsSegment::from_geometry(&geom).unwrap();
        assert!(matches!(segment, LrsSegment::MultiLine(_)));
        let rebuilt = segment.to_geometry().unwrap();
        assert!(rebuilt.is_multi_line_string());
        assert_eq!(rebuilt.srid(), 4326);
        assert_eq!(rebuilt, geom);

        let line = Geometry::from_wkt("LINESTRING(0 0 NULL 0, 1 0 NULL 1)", 3857).unwrap();
        let rebuilt = LrsSegment::from_geometry(&line).unwrap().to_geometry().unwrap();
        assert_eq!(rebuilt.srid(), 3857);
    }
}
