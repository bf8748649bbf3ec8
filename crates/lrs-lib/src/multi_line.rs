//! LRS multi-line: ordered member lines

use crate::{LrsError, LrsLine, Result};
use lrs_geometry::{GeometrySink, ShapeKind};

/// An ordered sequence of member lines, each with at least two points
#[derive(Clone, Debug)]
pub struct LrsMultiLine {
    lines: Vec<LrsLine>,
    srid: i32,
}

impl LrsMultiLine {
    /// Create an empty multi-line
    pub fn new(srid: i32) -> Self {
        Self {
            lines: Vec::new(),
            srid,
        }
    }

    /// Append a member line
    ///
    /// Lines with fewer than two points are rejected and `false` is returned.
    pub fn add_line(&mut self, line: LrsLine) -> bool {
        if !line.is_line() {
            tracing::warn!(
                "Rejecting member line with {} point(s) from multi-line",
                line.len()
            );
            return false;
        }
        self.lines.push(line);
        true
    }

    #[inline]
    pub fn lines(&self) -> &[LrsLine] {
        &self.lines
    }

    #[inline]
    pub(crate) fn lines_mut(&mut self) -> &mut [LrsLine] {
        &mut self.lines
    }

    /// Take ownership of the member lines
    pub fn into_lines(self) -> Vec<LrsLine> {
        self.lines
    }

    #[inline]
    pub fn srid(&self) -> i32 {
        self.srid
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// More than one member line
    #[inline]
    pub fn is_multi(&self) -> bool {
        self.lines.len() > 1
    }

    /// Sum of member lengths (gaps between members are not counted)
    pub fn length(&self) -> f64 {
        self.lines.iter().map(LrsLine::length).sum()
    }

    /// Total number of points across members
    pub fn num_points(&self) -> usize {
        self.lines.iter().map(LrsLine::len).sum()
    }

    /// Measure of the first point of the first member, 0 when absent
    pub fn start_measure(&self) -> f64 {
        self.lines.first().map_or(0.0, LrsLine::start_measure)
    }

    /// Measure of the last point of the last member, 0 when absent
    pub fn end_measure(&self) -> f64 {
        self.lines.last().map_or(0.0, LrsLine::end_measure)
    }

    /// Smallest and largest measure across all members
    pub fn measure_extent(&self) -> (f64, f64) {
        self.lines
            .iter()
            .map(LrsLine::measure_extent)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (min, max)| {
                (lo.min(min), hi.max(max))
            })
    }

    /// Members and their points in reverse traversal order
    pub fn reversed(&self) -> Self {
        Self {
            lines: self.lines.iter().rev().map(LrsLine::reversed).collect(),
            srid: self.srid,
        }
    }

    /// Emit as a MULTILINESTRING shape
    pub fn write_to<S: GeometrySink<LrsError> + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.set_srid(self.srid);
        sink.begin_shape(ShapeKind::MultiLineString)?;
        for line in &self.lines {
            line.write_part(sink)?;
        }
        sink.end_shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LrsPoint;

    fn line(points: &[(f64, f64, f64)]) -> LrsLine {
        LrsLine::from_points(
            points
                .iter()
                .map(|&(x, y, m)| LrsPoint::new(x, y, None, Some(m), 0)),
            0,
        )
    }

    #[test]
    fn test_add_line_rejects_single_point() {
        let mut multi = LrsMultiLine::new(0);
        assert!(!multi.add_line(line(&[(0.0, 0.0, 0.0)])));
        assert!(multi.is_empty());

        assert!(multi.add_line(line(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0)])));
        assert_eq!(multi.len(), 1);
        assert!(!multi.is_multi());
    }

    #[test]
    fn test_measures_and_length() {
        let mut multi = LrsMultiLine::new(0);
        multi.add_line(line(&[(0.0, 0.0, 0.0), (3.0, 4.0, 5.0)]));
        multi.add_line(line(&[(10.0, 0.0, 5.0), (10.0, 2.0, 7.0)]));

        assert!(multi.is_multi());
        assert!((multi.length() - 7.0).abs() < f64::EPSILON);
        assert_eq!(multi.start_measure(), 0.0);
        assert_eq!(multi.end_measure(), 7.0);
        assert_eq!(multi.measure_extent(), (0.0, 7.0));
        assert_eq!(multi.num_points(), 4);
    }

    #[test]
    fn test_reversed_reverses_members() {
        let mut multi = LrsMultiLine::new(0);
        multi.add_line(line(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0)]));
        multi.add_line(line(&[(2.0, 0.0, 2.0), (3.0, 0.0, 3.0)]));
        let reversed = multi.reversed();
        assert_eq!(reversed.start_measure(), 3.0);
        assert_eq!(reversed.end_measure(), 0.0);
    }
}
