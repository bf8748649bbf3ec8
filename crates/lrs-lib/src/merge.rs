//! Merging and connectivity of linear segments

use crate::{LrsError, LrsLine, LrsPoint, LrsSegment, Result};

/// Shift every measure of `line` by `offset`; unmeasured vertices stay unmeasured
fn shifted(line: &LrsLine, offset: f64) -> LrsLine {
    LrsLine::from_points(
        line.points()
            .iter()
            .map(|p| p.with_measure(p.m.map(|m| m + offset))),
        line.srid(),
    )
}

/// Append `tail` to `head`, dropping the first vertex of `tail` when its measure equals the
/// measure `head` ends with. Missing measures read as 0 on both sides.
fn join(head: &mut LrsLine, tail: LrsLine) {
    let end_m = head.end_measure();
    let mut points = tail.points().iter().peekable();
    if points
        .next_if(|first| (first.measure_or_zero() - end_m).abs() < f64::EPSILON)
        .is_some()
    {
        tracing::debug!("Dropping seam vertex at measure {end_m}");
    }
    for point in points {
        head.add_point(*point);
    }
}

/// Merge `second` onto the end of `first`
///
/// `second`'s measures are shifted by `first.end_measure - second.start_measure` so the
/// measure is continuous at the seam; vertices of `second` without a measure keep none. Two lines are always joined into one line. When either
/// side is a multi-line, the first member of `second` is joined to the last member of `first`
/// only if their facing endpoints are within `tolerance`; otherwise it becomes a new member.
pub(crate) fn merge_segments(
    first: &LrsSegment,
    second: &LrsSegment,
    tolerance: f64,
) -> Result<LrsSegment> {
    if first.srid() != second.srid() {
        return Err(LrsError::SridMismatch {
            left: first.srid(),
            right: second.srid(),
        });
    }
    let offset = first.end_measure() - second.start_measure();
    let srid = first.srid();

    let mut lines: Vec<LrsLine> = first.lines().to_vec();
    let mut tail = second.lines().iter().map(|line| shifted(line, offset));

    let join_first = match (first, second) {
        (LrsSegment::Line(_), LrsSegment::Line(_)) => true,
        _ => match (
            first.lines().last().and_then(LrsLine::end_point),
            second.lines().first().and_then(LrsLine::start_point),
        ) {
            (Some(end), Some(start)) => end.is_within_tolerance(start, tolerance),
            _ => false,
        },
    };
    if join_first {
        if let (Some(head), Some(next)) = (lines.last_mut(), tail.next()) {
            join(head, next);
        }
    }
    lines.extend(tail);

    LrsSegment::collapse(lines, srid)
        .ok_or_else(|| LrsError::InvalidGeometry("merge of two empty geometries".to_string()))
}

/// Endpoints of a segment: start of the first member, end of the last
fn endpoints(segment: &LrsSegment) -> Option<(LrsPoint, LrsPoint)> {
    match segment {
        LrsSegment::Point(point) => Some((*point, *point)),
        _ => {
            let lines = segment.lines();
            let start = lines.first().and_then(LrsLine::start_point)?;
            let end = lines.last().and_then(LrsLine::end_point)?;
            Some((*start, *end))
        }
    }
}

/// True when any endpoint of `a` matches any endpoint of `b`, exactly or per-axis within
/// `tolerance`
pub(crate) fn segments_connected(a: &LrsSegment, b: &LrsSegment, tolerance: f64) -> Result<bool> {
    if a.srid() != b.srid() {
        return Err(LrsError::SridMismatch {
            left: a.srid(),
            right: b.srid(),
        });
    }
    let (Some((a_start, a_end)), Some((b_start, b_end))) = (endpoints(a), endpoints(b)) else {
        return Ok(false);
    };
    Ok([a_start, a_end].iter().any(|p| {
        p.is_within_tolerance(&b_start, tolerance) || p.is_within_tolerance(&b_end, tolerance)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LrsMultiLine;

    fn line(points: &[(f64, f64, f64)]) -> LrsLine {
        LrsLine::from_points(
            points
                .iter()
                .map(|&(x, y, m)| LrsPoint::new(x, y, None, Some(m), 0)),
            0,
        )
    }

    fn multi(lines: Vec<LrsLine>) -> LrsSegment {
        let mut multi = LrsMultiLine::new(0);
        for l in lines {
            multi.add_line(l);
        }
        LrsSegment::MultiLine(multi)
    }

    #[test]
    fn test_merge_lines_shifts_and_drops_seam() {
        let a = LrsSegment::Line(line(&[(10.0, 1.0, 10.0), (25.0, 1.0, 25.0)]));
        let b = LrsSegment::Line(line(&[(30.0, 1.0, 30.0), (40.0, 1.0, 40.0)]));
        let LrsSegment::Line(merged) = merge_segments(&a, &b, 0.5).unwrap() else {
            panic!("expected a line");
        };
        let got: Vec<(f64, f64)> = merged
            .points()
            .iter()
            .map(|p| (p.x, p.measure_or_zero()))
            .collect();
        assert_eq!(got, vec![(10.0, 10.0), (25.0, 25.0), (40.0, 35.0)]);
    }

    fn unmeasured(points: &[(f64, f64)]) -> LrsLine {
        LrsLine::from_points(
            points.iter().map(|&(x, y)| LrsPoint::new(x, y, None, None, 0)),
            0,
        )
    }

    #[test]
    fn test_merge_unmeasured_lines_drops_seam() {
        let a = LrsSegment::Line(unmeasured(&[(0.0, 0.0), (1.0, 0.0)]));
        let b = LrsSegment::Line(unmeasured(&[(1.0, 0.0), (2.0, 0.0)]));
        let LrsSegment::Line(merged) = merge_segments(&a, &b, 0.5).unwrap() else {
            panic!("expected a line");
        };
        let xs: Vec<f64> = merged.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert!(merged.points().iter().all(|p| p.m.is_none()));
    }

    #[test]
    fn test_merge_unmeasured_tail_stays_unmeasured() {
        let a = LrsSegment::Line(line(&[(0.0, 0.0, 0.0), (1.0, 0.0, 4.0)]));
        let b = LrsSegment::Line(unmeasured(&[(1.0, 0.0), (2.0, 0.0)]));
        let LrsSegment::Line(merged) = merge_segments(&a, &b, 0.5).unwrap() else {
            panic!("expected a line");
        };
        let got: Vec<Option<f64>> = merged.points().iter().map(|p| p.m).collect();
        assert_eq!(got, vec![Some(0.0), Some(4.0), None, None]);
    }

    #[test]
    fn test_merge_multi_lines_joins_connected_members() {
        let a = multi(vec![
            line(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0)]),
            line(&[(2.0, 0.0, 1.0), (3.0, 0.0, 2.0)]),
        ]);
        let b = LrsSegment::Line(line(&[(3.2, 0.0, 0.0), (5.0, 0.0, 2.0)]));
        let merged = merge_segments(&a, &b, 0.5).unwrap();
        assert_eq!(merged.lines().len(), 2);
        assert_eq!(merged.lines()[1].len(), 3);
        assert_eq!(merged.end_measure(), 4.0);
    }

    #[test]
    fn test_merge_multi_lines_appends_disconnected_member() {
        let a = multi(vec![
            line(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0)]),
            line(&[(2.0, 0.0, 1.0), (3.0, 0.0, 2.0)]),
        ]);
        let b = LrsSegment::Line(line(&[(10.0, 0.0, 5.0), (11.0, 0.0, 6.0)]));
        let merged = merge_segments(&a, &b, 0.5).unwrap();
        assert_eq!(merged.lines().len(), 3);
        assert_eq!(merged.lines()[2].start_measure(), 2.0);
        assert_eq!(merged.end_measure(), 3.0);
    }

    #[test]
    fn test_merge_requires_same_srid() {
        let a = LrsSegment::Line(line(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0)]));
        let b = LrsSegment::Line(LrsLine::from_points(
            [
                LrsPoint::new(1.0, 0.0, None, Some(0.0), 4326),
                LrsPoint::new(2.0, 0.0, None, Some(1.0), 4326),
            ],
            4326,
        ));
        assert!(matches!(
            merge_segments(&a, &b, 0.5),
            Err(LrsError::SridMismatch { .. })
        ));
    }

    #[test]
    fn test_connected_uses_per_axis_tolerance() {
        let a = LrsSegment::Line(line(&[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0)]));
        let b = LrsSegment::Line(line(&[(1.4, 1.4, 0.0), (5.0, 5.0, 1.0)]));
        assert!(segments_connected(&a, &b, 0.5).unwrap());
        assert!(!segments_connected(&a, &b, 0.3).unwrap());

        let c = LrsSegment::Line(line(&[(9.0, 9.0, 0.0), (5.0, 5.0, 1.0)]));
        // end to end
        assert!(segments_connected(&b, &c, 0.0).unwrap());
    }
}
