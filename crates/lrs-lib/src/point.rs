//! Measured point of the LRS segment model

use crate::utils::measure_fraction;
use lrs_geometry::Coord;

/// A vertex of an LRS line
///
/// Besides its coordinates a point carries the derived quantities the offset engine computes
/// for it (slope and bearing of the outgoing segment, offset angle and scaled offset distance).
/// They are `None` until [`LrsLine::compute_offset_geometry`](crate::LrsLine::compute_offset_geometry) fills them in.
#[derive(Clone, Copy, Debug)]
pub struct LrsPoint {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
    pub srid: i32,
    pub(crate) slope: Option<f64>,
    pub(crate) offset_bearing: Option<f64>,
    pub(crate) offset_angle: Option<f64>,
    pub(crate) offset_distance: Option<f64>,
}

impl LrsPoint {
    /// Create a new point
    pub fn new(x: f64, y: f64, z: Option<f64>, m: Option<f64>, srid: i32) -> Self {
        Self {
            x,
            y,
            z,
            m,
            srid,
            slope: None,
            offset_bearing: None,
            offset_angle: None,
            offset_distance: None,
        }
    }

    /// Create a point from a three-value coordinate
    ///
    /// Without an explicit measure the third value is a measure, not an elevation.
    pub fn from_xyz(x: f64, y: f64, third: f64, srid: i32) -> Self {
        Self::new(x, y, None, Some(third), srid)
    }

    /// Create a point from a provider coordinate
    #[inline]
    pub fn from_coord(coord: Coord, srid: i32) -> Self {
        Self::new(coord.x, coord.y, coord.z, coord.m, srid)
    }

    /// Convert back to a provider coordinate
    #[inline]
    pub fn to_coord(&self) -> Coord {
        Coord::new(self.x, self.y, self.z, self.m)
    }

    /// Measure, treating a missing one as zero
    #[inline]
    pub fn measure_or_zero(&self) -> f64 {
        self.m.unwrap_or(0.0)
    }

    /// Return a copy with the measure replaced
    #[inline]
    pub fn with_measure(self, m: Option<f64>) -> Self {
        Self { m, ..self }
    }

    /// Equality on `(x, y, m)` within `f64::EPSILON`; elevation is ignored
    pub fn approx_eq(&self, other: &LrsPoint) -> bool {
        let measures_equal = match (self.m, other.m) {
            (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
            (None, None) => true,
            _ => false,
        };
        (self.x - other.x).abs() < f64::EPSILON
            && (self.y - other.y).abs() < f64::EPSILON
            && measures_equal
    }

    /// Planar difference vector `self - other`
    #[inline]
    pub fn subtract(&self, other: &LrsPoint) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }

    /// Planar Euclidean distance
    #[inline]
    pub fn distance_to(&self, other: &LrsPoint) -> f64 {
        let (dx, dy) = other.subtract(self);
        dx.hypot(dy)
    }

    /// True when both ordinates are within `tolerance` of `other` (checked independently)
    pub fn is_within_tolerance(&self, other: &LrsPoint, tolerance: f64) -> bool {
        let (dx, dy) = self.subtract(other);
        (dx == 0.0 && dy == 0.0) || (dx.abs() <= tolerance && dy.abs() <= tolerance)
    }

    /// Slope `dy / dx` of the segment to `next`, `None` for vertical or zero-length segments
    pub fn slope_to(&self, next: &LrsPoint) -> Option<f64> {
        let (dx, dy) = next.subtract(self);
        (dx != 0.0).then(|| dy / dx)
    }

    /// Compass bearing in degrees `[0, 360)` of the segment to `next` (0 = north, clockwise)
    ///
    /// `None` for zero-length segments.
    pub fn offset_bearing_to(&self, next: &LrsPoint) -> Option<f64> {
        let (dx, dy) = next.subtract(self);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some((90.0 - dy.atan2(dx).to_degrees() + 360.0) % 360.0)
    }

    /// Point at measure `m` on the segment to `next`, interpolating x/y over the measure fraction
    ///
    /// The synthesized point carries no elevation.
    pub fn interpolate_by_measure(&self, next: &LrsPoint, m: f64) -> LrsPoint {
        let fraction = measure_fraction(self.measure_or_zero(), next.measure_or_zero(), m);
        LrsPoint::new(
            self.x + (next.x - self.x) * fraction,
            self.y + (next.y - self.y) * fraction,
            None,
            Some(m),
            self.srid,
        )
    }

    /// Point at planar `distance` from `self` towards `next`
    ///
    /// The measure is interpolated when both ends carry one. `distance` must lie within the
    /// segment; callers validate it.
    pub fn interpolate_by_distance(&self, next: &LrsPoint, distance: f64) -> LrsPoint {
        let length = self.distance_to(next);
        let fraction = if length == 0.0 { 0.0 } else { distance / length };
        let m = match (self.m, next.m) {
            (Some(m1), Some(m2)) => Some(m1 * (1.0 - fraction) + m2 * fraction),
            _ => None,
        };
        LrsPoint::new(
            self.x * (1.0 - fraction) + next.x * fraction,
            self.y * (1.0 - fraction) + next.y * fraction,
            None,
            m,
            self.srid,
        )
    }

    /// Slope of the outgoing segment, once computed by the offset engine
    #[inline]
    pub fn slope(&self) -> Option<f64> {
        self.slope
    }

    /// Bearing of the outgoing segment, once computed by the offset engine
    #[inline]
    pub fn offset_bearing(&self) -> Option<f64> {
        self.offset_bearing
    }

    /// Direction in which this vertex is displaced, once computed by the offset engine
    #[inline]
    pub fn offset_angle(&self) -> Option<f64> {
        self.offset_angle
    }

    /// Displacement length along the offset angle, once computed by the offset engine
    #[inline]
    pub fn offset_distance(&self) -> Option<f64> {
        self.offset_distance
    }
}
