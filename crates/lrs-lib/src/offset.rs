//! Offset engine: lines parallel to a measured line at a signed lateral distance
//!
//! Angles are compass bearings in degrees (0 = north, clockwise). A positive offset lies on
//! the left of the direction of increasing measure, so on a line whose measures decrease along
//! the traversal it lies on the right of the traversal.

use crate::utils::normalize_degrees;
use crate::{LrsError, LrsLine, LrsPoint, LrsSegment, Result};
use smallvec::SmallVec;

/// Offset-side half-angle (degrees) from which a join is beveled instead of mitered
///
/// 135° on the offset side means the line turns away from it by 90° or more.
const SHARP_HALF_ANGLE: f64 = 135.0;

const SIN_EPSILON: f64 = 1e-9;

/// Unit vector of a compass bearing
#[inline]
fn direction(bearing: f64) -> (f64, f64) {
    let radians = (90.0 - bearing).to_radians();
    (radians.cos(), radians.sin())
}

/// `point` moved `distance` along `bearing`; keeps the measure, drops the elevation
#[inline]
fn displace(point: &LrsPoint, bearing: f64, distance: f64) -> LrsPoint {
    let (dx, dy) = direction(bearing);
    LrsPoint::new(
        point.x + distance * dx,
        point.y + distance * dy,
        None,
        point.m,
        point.srid,
    )
}

/// Rotation from a segment bearing to its normal on the offset side
#[inline]
fn side_rotation(left: bool) -> f64 {
    if left { -90.0 } else { 90.0 }
}

/// Half of the angle between the incoming and outgoing segments, measured on the offset side
fn offset_side_half_angle(incoming: f64, outgoing: f64, left: bool) -> f64 {
    let turn = normalize_degrees(incoming + 180.0 - outgoing);
    let left_half = (360.0 - turn) / 2.0;
    if left { left_half } else { 180.0 - left_half }
}

/// Offset angle of a vertex from the bearings of the segments around it
fn offset_angle(incoming: Option<f64>, outgoing: Option<f64>, left: bool) -> Option<f64> {
    match (incoming, outgoing) {
        (Some(b2), Some(b1)) => {
            let turn = normalize_degrees(b2 + 180.0 - b1);
            let bisector = normalize_degrees(360.0 + b1 - (360.0 - turn) / 2.0);
            Some(if left {
                bisector
            } else {
                normalize_degrees(bisector + 180.0)
            })
        }
        (Some(bearing), None) | (None, Some(bearing)) => {
            Some(normalize_degrees(bearing + side_rotation(left)))
        }
        (None, None) => None,
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LrsLine {
    /// Copy of the line without consecutive coincident vertices
    fn without_repeated_points(&self) -> LrsLine {
        let mut out = LrsLine::new(self.srid());
        for point in self.points() {
            if out
                .end_point()
                .is_some_and(|last| last.x == point.x && last.y == point.y)
            {
                continue;
            }
            out.add_point(*point);
        }
        out
    }

    /// Compute slope, offset bearing, offset angle and offset distance of every vertex
    ///
    /// The bearing and slope describe the segment leaving the vertex and are `None` on the last
    /// vertex. The offset angle is the direction the vertex moves in: a ±90° rotation of the
    /// single bearing at the ends, the bisector of the two segment normals elsewhere. The offset
    /// distance is `|offset| / |sin(bearing - angle)|`, so straight runs stay `|offset|` away
    /// from the line. A join whose sine vanishes (the line folds back onto itself) continues
    /// straight along the outgoing normal at `|offset|`.
    pub fn compute_offset_geometry(&mut self, offset: f64) {
        let left = self.is_increasing() == (offset >= 0.0);
        let magnitude = offset.abs();

        let points = self.points_mut();
        let count = points.len();
        for i in 0..count {
            let (slope, bearing) = match points.get(i + 1) {
                Some(next) => (points[i].slope_to(next), points[i].offset_bearing_to(next)),
                None => (None, None),
            };
            points[i].slope = slope;
            points[i].offset_bearing = bearing;
        }

        for i in 0..count {
            let incoming = i.checked_sub(1).and_then(|j| points[j].offset_bearing);
            let outgoing = points[i].offset_bearing;
            let Some(angle) = offset_angle(incoming, outgoing, left) else {
                continue;
            };
            let reference = outgoing.or(incoming).unwrap_or(angle);
            let sin = normalize_degrees(reference - angle).to_radians().sin().abs();
            let (angle, distance) = if sin < SIN_EPSILON {
                tracing::debug!("Degenerate offset join at vertex {i}, continuing straight");
                (
                    normalize_degrees(reference + side_rotation(left)),
                    magnitude,
                )
            } else {
                (angle, magnitude / sin)
            };
            points[i].offset_angle = Some(angle);
            points[i].offset_distance = Some(distance);
        }
    }

    /// Line parallel to this one at `offset`
    ///
    /// Vertices keep their measures. At a sharp join the single offset vertex is replaced by
    /// the offset points of the incoming and outgoing segments, with the bisector point between
    /// them when they are more than `tolerance` apart.
    pub fn parallel(&self, offset: f64, tolerance: f64) -> Result<LrsLine> {
        let mut line = self.without_repeated_points();
        if !line.is_line() {
            return Err(LrsError::Degenerate(
                "cannot offset a line without two distinct vertices".to_string(),
            ));
        }
        line.compute_offset_geometry(offset);
        let left = line.is_increasing() == (offset >= 0.0);
        let magnitude = offset.abs();

        let points = line.points();
        let mut out = LrsLine::new(line.srid());
        for (i, point) in points.iter().enumerate() {
            let incoming = i.checked_sub(1).and_then(|j| points[j].offset_bearing);
            let outgoing = point.offset_bearing;
            let displaced: SmallVec<[LrsPoint; 3]> = match (incoming, outgoing) {
                (Some(b2), Some(b1)) if offset_side_half_angle(b2, b1, left) >= SHARP_HALF_ANGLE => {
                    let rotation = side_rotation(left);
                    let before = displace(point, b2 + rotation, magnitude);
                    let after = displace(point, b1 + rotation, magnitude);
                    let mut bend = SmallVec::new();
                    bend.push(before);
                    if before.distance_to(&after) > tolerance {
                        let angle = point.offset_angle.unwrap_or(b1 + rotation);
                        bend.push(displace(point, angle, magnitude));
                    }
                    bend.push(after);
                    bend
                }
                _ => match (point.offset_angle, point.offset_distance) {
                    (Some(angle), Some(distance)) => {
                        SmallVec::from_elem(displace(point, angle, distance), 1)
                    }
                    _ => SmallVec::from_elem(*point, 1),
                },
            };
            for p in displaced {
                if out
                    .end_point()
                    .is_some_and(|last| last.x == p.x && last.y == p.y)
                {
                    continue;
                }
                out.add_point(p);
            }
        }
        Ok(out)
    }
}

/// Offset every member of a line or multi-line
pub(crate) fn offset_segment(
    segment: &LrsSegment,
    offset: f64,
    tolerance: f64,
) -> Result<LrsSegment> {
    #[cfg(feature = "profiling")]
    profiling::scope!("offset::offset_segment");

    if let LrsSegment::Point(point) = segment {
        return Err(LrsError::Degenerate(format!(
            "range collapsed to a single point at measure {}",
            point.measure_or_zero()
        )));
    }
    let lines = segment
        .lines()
        .iter()
        .map(|line| line.parallel(offset, tolerance))
        .collect::<Result<Vec<_>>>()?;
    LrsSegment::collapse(lines, segment.srid())
        .ok_or_else(|| LrsError::Degenerate("offset produced no line".to_string()))
}
