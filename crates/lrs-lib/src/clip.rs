//! Clipping by measure range

use crate::utils::is_between;
use crate::{LrsError, LrsLine, LrsMultiLine, LrsPoint, LrsSegment, Result};
use smallvec::SmallVec;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LrsLine {
    /// Part of the line whose measures lie in `[min(start_m, end_m), max(start_m, end_m)]`
    ///
    /// Vertices keep their traversal order. Where a range boundary falls strictly inside a
    /// segment a vertex is synthesized there by measure interpolation. Entry and exit boundaries
    /// are synthesized independently; afterwards a synthesized vertex lying within `tolerance` of
    /// a neighbouring source vertex is dropped, as long as at least two vertices remain. The
    /// result holds a single point only when the range touches the line at one measure, and
    /// none when the range misses the line.
    pub fn clip(&self, start_m: f64, end_m: f64, tolerance: f64) -> LrsLine {
        let (lo, hi) = (start_m.min(end_m), start_m.max(end_m));
        // (point, synthesized)
        let mut kept: Vec<(LrsPoint, bool)> = Vec::new();

        for (i, point) in self.points().iter().enumerate() {
            let m = point.measure_or_zero();

            if let Some(previous) = i.checked_sub(1).map(|j| &self.points()[j]) {
                let pm = previous.measure_or_zero();
                let mut boundaries: SmallVec<[f64; 2]> = [lo, hi]
                    .into_iter()
                    .filter(|&b| b > pm.min(m) && b < pm.max(m))
                    .collect();
                boundaries.dedup();
                if pm > m {
                    boundaries.reverse();
                }
                for boundary in boundaries {
                    kept.push((previous.interpolate_by_measure(point, boundary), true));
                }
            }

            if m >= lo && m <= hi {
                kept.push((*point, false));
            }
        }

        let mut i = 0;
        while i < kept.len() {
            let (point, synthesized) = kept[i];
            let near_source = |j: Option<usize>| {
                j.and_then(|j| kept.get(j))
                    .is_some_and(|&(p, s)| !s && p.distance_to(&point) <= tolerance)
            };
            if synthesized
                && kept.len() > 2
                && (near_source(i.checked_sub(1)) || near_source(Some(i + 1)))
            {
                tracing::debug!(
                    "Skipping boundary vertex at measure {}, within tolerance of a source vertex",
                    point.measure_or_zero()
                );
                kept.remove(i);
            } else {
                i += 1;
            }
        }

        LrsLine::from_points(kept.into_iter().map(|(point, _)| point), self.srid())
    }
}

/// Clip a line or multi-line to a measure range
///
/// `start_point` / `end_point` are the located range boundaries, used by the member range test
/// of multi-lines. Fails with [`LrsError::MeasureOutOfRange`] when nothing of the input lies in
/// the range.
pub(crate) fn clip_segment(
    segment: LrsSegment,
    start_m: f64,
    end_m: f64,
    tolerance: f64,
    boundary_points: (Option<LrsPoint>, Option<LrsPoint>),
) -> Result<LrsSegment> {
    #[cfg(feature = "profiling")]
    profiling::scope!("clip::clip_segment");

    let (lo, hi) = (start_m.min(end_m), start_m.max(end_m));
    let out_of_range = |extent: (f64, f64)| LrsError::MeasureOutOfRange {
        measure: if hi < extent.0 { hi } else { lo },
        start: extent.0,
        end: extent.1,
    };

    let srid = segment.srid();
    match segment {
        LrsSegment::Point(point) => {
            let m = point.measure_or_zero();
            if is_between(lo, hi, m) {
                Ok(LrsSegment::Point(point))
            } else {
                Err(out_of_range((m, m)))
            }
        }
        LrsSegment::Line(line) => {
            let extent = line.measure_extent();
            if hi < extent.0 || lo > extent.1 {
                return Err(out_of_range(extent));
            }
            let clipped = line.clip(lo, hi, tolerance);
            LrsSegment::collapse(vec![clipped], srid).ok_or_else(|| out_of_range(extent))
        }
        LrsSegment::MultiLine(multi) => {
            let extent = multi.measure_extent();
            if hi < extent.0 || lo > extent.1 {
                return Err(out_of_range(extent));
            }
            let lines = clip_members(multi, lo, hi, tolerance, boundary_points);
            LrsSegment::collapse(lines, srid).ok_or_else(|| out_of_range(extent))
        }
    }
}

fn clip_members(
    mut multi: LrsMultiLine,
    lo: f64,
    hi: f64,
    tolerance: f64,
    (start_point, end_point): (Option<LrsPoint>, Option<LrsPoint>),
) -> Vec<LrsLine> {
    let mut clipped = Vec::with_capacity(multi.len());
    for (index, line) in multi.lines_mut().iter_mut().enumerate() {
        if !line.is_within_range(lo, hi, start_point.as_ref(), end_point.as_ref()) {
            tracing::debug!("Dropping member {index}, outside of [{lo}, {hi}]");
            continue;
        }
        if line.is_completely_in_range() {
            tracing::debug!("Keeping member {index} whole");
            clipped.push(line.clone());
            continue;
        }
        let (min, max) = line.measure_extent();
        let piece = line.clip(lo.max(min), hi.min(max), tolerance);
        if piece.is_line() {
            clipped.push(piece);
        } else {
            tracing::debug!("Dropping member {index}, clipped down to a single point");
        }
    }
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64, f64)]) -> LrsLine {
        LrsLine::from_points(
            points
                .iter()
                .map(|&(x, y, m)| LrsPoint::new(x, y, None, Some(m), 0)),
            0,
        )
    }

    fn coords(line: &LrsLine) -> Vec<(f64, f64, f64)> {
        line.points()
            .iter()
            .map(|p| (p.x, p.y, p.measure_or_zero()))
            .collect()
    }

    #[test]
    fn test_clip_keeps_vertices_and_synthesizes_boundary() {
        let l = line(&[(10.0, 1.0, 10.0), (25.0, 1.0, 25.0)]);
        let clipped = l.clip(10.0, 15.0, 0.5);
        assert_eq!(coords(&clipped), vec![(10.0, 1.0, 10.0), (15.0, 1.0, 15.0)]);
    }

    #[test]
    fn test_clip_inside_single_segment_synthesizes_both_ends() {
        let l = line(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]);
        let clipped = l.clip(7.5, 2.5, 0.0);
        assert_eq!(coords(&clipped), vec![(2.5, 0.0, 2.5), (7.5, 0.0, 7.5)]);
    }

    #[test]
    fn test_clip_decreasing_line_keeps_traversal_order() {
        let l = line(&[(0.0, 0.0, 10.0), (5.0, 0.0, 5.0), (10.0, 0.0, 0.0)]);
        let clipped = l.clip(2.0, 8.0, 0.0);
        assert_eq!(
            coords(&clipped),
            vec![(2.0, 0.0, 8.0), (5.0, 0.0, 5.0), (8.0, 0.0, 2.0)]
        );
    }

    #[test]
    fn test_clip_skips_boundary_within_tolerance() {
        let l = line(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0), (20.0, 0.0, 20.0)]);
        let clipped = l.clip(0.0, 10.2, 0.5);
        assert_eq!(coords(&clipped), vec![(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]);

        let clipped = l.clip(0.0, 10.2, 0.1);
        assert_eq!(clipped.len(), 3);
    }

    #[test]
    fn test_clip_narrow_range_inside_segment_keeps_both_boundaries() {
        let l = line(&[(0.0, 0.0, 0.0), (8.0, 0.0, 8.0)]);
        let clipped = l.clip(2.0, 2.25, 0.5);
        assert_eq!(coords(&clipped), vec![(2.0, 0.0, 2.0), (2.25, 0.0, 2.25)]);
    }

    #[test]
    fn test_clip_never_drops_below_two_vertices() {
        // Both boundaries sit within tolerance of the only source vertex in range
        let l = line(&[(0.0, 0.0, 0.0), (2.125, 0.0, 2.125), (4.125, 0.0, 4.125)]);
        let clipped = l.clip(2.0, 2.25, 0.5);
        assert_eq!(coords(&clipped), vec![(2.125, 0.0, 2.125), (2.25, 0.0, 2.25)]);
    }

    #[test]
    fn test_clip_segment_out_of_range() {
        let l = line(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]);
        let result = clip_segment(LrsSegment::Line(l), 20.0, 30.0, 0.5, (None, None));
        assert!(matches!(
            result,
            Err(LrsError::MeasureOutOfRange { measure, .. }) if measure == 20.0
        ));
    }

    #[test]
    fn test_clip_segment_touching_end_is_point() {
        let l = line(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]);
        let result = clip_segment(LrsSegment::Line(l), 10.0, 30.0, 0.5, (None, None)).unwrap();
        assert!(matches!(result, LrsSegment::Point(p) if p.m == Some(10.0)));
    }

    #[test]
    fn test_clip_multi_line_members() {
        let mut multi = LrsMultiLine::new(0);
        multi.add_line(line(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]));
        multi.add_line(line(&[(10.0, 0.0, 10.0), (20.0, 0.0, 20.0)]));
        multi.add_line(line(&[(20.0, 0.0, 20.0), (30.0, 0.0, 30.0)]));

        let result = clip_segment(
            LrsSegment::MultiLine(multi.clone()),
            5.0,
            25.0,
            0.5,
            (None, None),
        )
        .unwrap();
        let LrsSegment::MultiLine(clipped) = result else {
            panic!("expected a multi-line");
        };
        assert_eq!(clipped.len(), 3);
        assert_eq!(clipped.start_measure(), 5.0);
        assert_eq!(clipped.end_measure(), 25.0);
        assert_eq!(coords(&clipped.lines()[1]), vec![(10.0, 0.0, 10.0), (20.0, 0.0, 20.0)]);

        // A range inside one member collapses to a line
        let result =
            clip_segment(LrsSegment::MultiLine(multi), 12.0, 18.0, 0.5, (None, None)).unwrap();
        let LrsSegment::Line(clipped) = result else {
            panic!("expected a line");
        };
        assert_eq!(coords(&clipped), vec![(12.0, 0.0, 12.0), (18.0, 0.0, 18.0)]);
    }
}
