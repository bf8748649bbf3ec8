//! LRS line: ordered measured points with an incrementally tracked length

use crate::{LrsError, LrsPoint, Result};
use lrs_geometry::{GeometrySink, ShapeKind};

/// An ordered sequence of measured points
///
/// `length` is accumulated as points are appended, so prefix lengths are available while
/// building. `is_in_range` / `is_completely_in_range` cache the result of the last
/// [`LrsLine::is_within_range`] query and are overwritten by the next one.
#[derive(Clone, Debug)]
pub struct LrsLine {
    points: Vec<LrsPoint>,
    length: f64,
    srid: i32,
    is_in_range: bool,
    is_completely_in_range: bool,
}

impl LrsLine {
    /// Create an empty line
    pub fn new(srid: i32) -> Self {
        Self {
            points: Vec::new(),
            length: 0.0,
            srid,
            is_in_range: false,
            is_completely_in_range: false,
        }
    }

    /// Create a line from points in traversal order
    pub fn from_points(points: impl IntoIterator<Item = LrsPoint>, srid: i32) -> Self {
        let mut line = Self::new(srid);
        for point in points {
            line.add_point(point);
        }
        line
    }

    /// Append a point, adding the distance from the previous point to the running length
    pub fn add_point(&mut self, point: LrsPoint) {
        if let Some(last) = self.points.last() {
            self.length += last.distance_to(&point);
        }
        self.points.push(point);
    }

    #[inline]
    pub fn points(&self) -> &[LrsPoint] {
        &self.points
    }

    #[inline]
    pub(crate) fn points_mut(&mut self) -> &mut [LrsPoint] {
        &mut self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Planar length accumulated so far
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Exactly one point
    #[inline]
    pub fn is_point(&self) -> bool {
        self.points.len() == 1
    }

    /// At least two points
    #[inline]
    pub fn is_line(&self) -> bool {
        self.points.len() >= 2
    }

    #[inline]
    pub fn start_point(&self) -> Option<&LrsPoint> {
        self.points.first()
    }

    #[inline]
    pub fn end_point(&self) -> Option<&LrsPoint> {
        self.points.last()
    }

    /// Measure of the first point, 0 when absent
    pub fn start_measure(&self) -> f64 {
        self.start_point().map_or(0.0, LrsPoint::measure_or_zero)
    }

    /// Measure of the last point, 0 when absent
    pub fn end_measure(&self) -> f64 {
        self.end_point().map_or(0.0, LrsPoint::measure_or_zero)
    }

    /// True when every point carries a measure
    pub fn has_measures(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.m.is_some())
    }

    /// Smallest and largest measure of the line
    pub fn measure_extent(&self) -> (f64, f64) {
        let start = self.start_measure();
        let end = self.end_measure();
        (start.min(end), start.max(end))
    }

    /// True when measures grow (or stay constant) along the traversal
    #[inline]
    pub fn is_increasing(&self) -> bool {
        self.end_measure() >= self.start_measure()
    }

    /// Same points in reverse traversal order
    pub fn reversed(&self) -> Self {
        Self::from_points(self.points.iter().rev().copied(), self.srid)
    }

    /// Test this line against the measure range `[start_m, end_m]`
    ///
    /// Counts the points whose measure lies in the range or that equal one of the clip
    /// boundary points. More than one such point marks the line in range; all of them marks it
    /// completely in range. A range that falls strictly inside a single segment leaves no
    /// vertex to count, so overlap of the line's own measure extent with the range also marks
    /// it in range.
    pub fn is_within_range(
        &mut self,
        start_m: f64,
        end_m: f64,
        start_point: Option<&LrsPoint>,
        end_point: Option<&LrsPoint>,
    ) -> bool {
        let (lo, hi) = (start_m.min(end_m), start_m.max(end_m));
        let count = self
            .points
            .iter()
            .filter(|p| {
                let in_range = p.m.is_some_and(|m| m >= lo && m <= hi);
                in_range
                    || start_point.is_some_and(|b| b.approx_eq(p))
                    || end_point.is_some_and(|b| b.approx_eq(p))
            })
            .count();

        let (min, max) = self.measure_extent();
        let overlaps = min < hi && max > lo;

        self.is_in_range = count > 1 || overlaps;
        self.is_completely_in_range = !self.points.is_empty() && count == self.points.len();
        self.is_in_range
    }

    /// Result of the last range query
    #[inline]
    pub fn is_in_range(&self) -> bool {
        self.is_in_range
    }

    /// Result of the last range query
    #[inline]
    pub fn is_completely_in_range(&self) -> bool {
        self.is_completely_in_range
    }

    /// Emit this line as one part (`begin_part`, `line_to`*, `end_part`)
    pub fn write_part<S: GeometrySink<LrsError> + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Ok(());
        };
        sink.begin_part(first.to_coord())?;
        for point in iter {
            sink.line_to(point.to_coord())?;
        }
        sink.end_part()
    }

    /// Emit this line as a complete LINESTRING shape
    pub fn write_to<S: GeometrySink<LrsError> + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.set_srid(self.srid);
        sink.begin_shape(ShapeKind::LineString)?;
        self.write_part(sink)?;
        sink.end_shape()
    }
}
