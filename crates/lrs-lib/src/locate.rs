//! Point location along lines, by measure or by distance

use crate::utils::is_between;
use crate::{LrsError, LrsLine, LrsPoint, LrsSegment, Result};

impl LrsLine {
    /// Point at measure `m`, or `None` when `m` lies outside the line's measure extent
    ///
    /// A measure equal to a vertex's measure returns that vertex; otherwise the first segment
    /// straddling `m` is interpolated over the measure fraction.
    pub fn locate_at_measure(&self, m: f64) -> Option<LrsPoint> {
        let points = self.points();
        if let [single] = points {
            return (single.measure_or_zero() == m).then_some(*single);
        }
        points.windows(2).find_map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            let (ma, mb) = (a.measure_or_zero(), b.measure_or_zero());
            if ma == m {
                Some(*a)
            } else if mb == m {
                Some(*b)
            } else if is_between(ma, mb, m) {
                Some(a.interpolate_by_measure(b, m))
            } else {
                None
            }
        })
    }

    /// Point at planar `distance` from the start, or `None` when past either end
    pub fn locate_at_distance(&self, distance: f64) -> Option<LrsPoint> {
        if distance < 0.0 || distance > self.length() {
            return None;
        }
        let points = self.points();
        let mut travelled = 0.0;
        for pair in points.windows(2) {
            let step = pair[0].distance_to(&pair[1]);
            if distance <= travelled + step {
                return Some(pair[0].interpolate_by_distance(&pair[1], distance - travelled));
            }
            travelled += step;
        }
        // Rounding in the running sum can leave the exact total just past the last segment
        points.last().copied()
    }
}

/// Point at measure `m` on a line or multi-line
///
/// Members are searched in traversal order and the first one containing `m` answers. No
/// clamping: a measure outside every member fails with [`LrsError::MeasureOutOfRange`].
pub(crate) fn locate_in_segment(segment: &LrsSegment, m: f64) -> Result<LrsPoint> {
    let found = match segment {
        LrsSegment::Point(point) => (point.measure_or_zero() == m).then_some(*point),
        _ => segment
            .lines()
            .iter()
            .find_map(|line| line.locate_at_measure(m)),
    };
    found.ok_or_else(|| {
        let (start, end) = segment_extent(segment);
        LrsError::MeasureOutOfRange {
            measure: m,
            start,
            end,
        }
    })
}

/// Point at planar `distance` along a line or multi-line; gaps between members are not counted
pub(crate) fn locate_distance_in_segment(segment: &LrsSegment, distance: f64) -> Result<LrsPoint> {
    let total: f64 = segment.lines().iter().map(LrsLine::length).sum();
    let out_of_range = || {
        LrsError::InvalidArgument(format!(
            "distance {distance} is outside of the line length [0, {total}]"
        ))
    };
    if distance < 0.0 || distance > total {
        return Err(out_of_range());
    }

    let mut remaining = distance;
    let lines = segment.lines();
    for (index, line) in lines.iter().enumerate() {
        if remaining <= line.length() || index + 1 == lines.len() {
            return line
                .locate_at_distance(remaining.min(line.length()))
                .ok_or_else(out_of_range);
        }
        remaining -= line.length();
    }
    Err(out_of_range())
}

/// Point at planar `distance` from `from` towards `to`
///
/// The measure is interpolated when both points carry one.
pub(crate) fn interpolate_points(from: &LrsPoint, to: &LrsPoint, distance: f64) -> Result<LrsPoint> {
    if from.srid != to.srid {
        return Err(LrsError::SridMismatch {
            left: from.srid,
            right: to.srid,
        });
    }
    let length = from.distance_to(to);
    if !(0.0..=length).contains(&distance) {
        return Err(LrsError::InvalidArgument(format!(
            "distance {distance} is outside of [0, {length}]"
        )));
    }
    Ok(from.interpolate_by_distance(to, distance))
}

fn segment_extent(segment: &LrsSegment) -> (f64, f64) {
    match segment {
        LrsSegment::Point(point) => (point.measure_or_zero(), point.measure_or_zero()),
        LrsSegment::Line(line) => line.measure_extent(),
        LrsSegment::MultiLine(multi) => multi.measure_extent(),
    }
}
