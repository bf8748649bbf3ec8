//! Splitting at a measure

use crate::{LrsError, LrsLine, LrsSegment, Result};

impl LrsLine {
    /// Split into the part before and the part after measure `m`, in traversal order
    ///
    /// "Before" follows the line's own direction: on a decreasing line the vertices with larger
    /// measures come first. A vertex exactly at `m` is shared by both parts; when `m` falls
    /// strictly inside a segment the interpolated point ends the first part and starts the
    /// second. Either part may end up with a single point or none.
    pub fn split_at(&self, m: f64) -> (LrsLine, LrsLine) {
        let increasing = self.is_increasing();
        let before = |measure: f64| if increasing { measure < m } else { measure > m };

        let mut first = LrsLine::new(self.srid());
        let mut second = LrsLine::new(self.srid());
        for (i, point) in self.points().iter().enumerate() {
            let pm = point.measure_or_zero();
            if let Some(previous) = i.checked_sub(1).map(|j| &self.points()[j]) {
                let prev_m = previous.measure_or_zero();
                if m > prev_m.min(pm) && m < prev_m.max(pm) {
                    let boundary = previous.interpolate_by_measure(point, m);
                    first.add_point(boundary);
                    second.add_point(boundary);
                }
            }
            if pm == m {
                first.add_point(*point);
                second.add_point(*point);
            } else if before(pm) {
                first.add_point(*point);
            } else {
                second.add_point(*point);
            }
        }
        (first, second)
    }
}

/// Split a line or multi-line at measure `m`
///
/// Each member is split independently; a member wholly on one side contributes only to that
/// side. Fails with [`LrsError::MeasureOutOfRange`] when `m` is outside the measure extent.
pub(crate) fn split_segment(segment: &LrsSegment, m: f64) -> Result<(LrsSegment, LrsSegment)> {
    let lines = segment.lines();
    let (start, end) = lines
        .iter()
        .map(LrsLine::measure_extent)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (min, max)| {
            (lo.min(min), hi.max(max))
        });
    if lines.is_empty() || m < start || m > end {
        return Err(LrsError::MeasureOutOfRange {
            measure: m,
            start,
            end,
        });
    }

    let (firsts, seconds): (Vec<LrsLine>, Vec<LrsLine>) =
        lines.iter().map(|line| line.split_at(m)).unzip();
    let srid = segment.srid();
    let side = |parts: Vec<LrsLine>| {
        LrsSegment::collapse(parts, srid)
            .ok_or_else(|| LrsError::Degenerate(format!("nothing left on one side of measure {m}")))
    };
    Ok((side(firsts)?, side(seconds)?))
}
