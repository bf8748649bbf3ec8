//! Function surface over provider geometries
//!
//! Every function takes and returns [`Geometry`] values plus scalars, builds whatever internal
//! state it needs for the call and drops it on return. Inputs whose only third ordinate is an
//! untagged Z are read as measured (see [`normalize_measures`]).

use crate::clip::clip_segment;
use crate::locate::{interpolate_points, locate_distance_in_segment, locate_in_segment};
use crate::merge::{merge_segments, segments_connected};
use crate::offset::offset_segment;
use crate::pipeline::{
    MeasureTransform, MeasureTransformSink, MeasureValidator, PopulateMeasureSink, ReverseSink,
    ShapeContext, ShiftSink, ValidationStatus,
};
use crate::split::split_segment;
use crate::{
    LrsError, LrsPoint, LrsSegment, Result, normalize_measures, require_same_srid,
};
use lrs_geometry::{Geometry, GeometryBuilder, Shape, ShapeKind};

const LINEAR: &str = "LINESTRING or MULTILINESTRING";

fn require_linear(geom: &Geometry, operation: &'static str) -> Result<()> {
    match geom.kind() {
        ShapeKind::LineString | ShapeKind::MultiLineString => Ok(()),
        _ => Err(LrsError::type_mismatch(operation, LINEAR, geom)),
    }
}

/// Load a linear geometry whose measures are present and monotonic
///
/// Vertices without a measure receive one interpolated from their measured neighbours.
fn load_measured(geom: &Geometry, operation: &'static str) -> Result<LrsSegment> {
    require_linear(geom, operation)?;
    let geom = normalize_measures(geom);
    match validate(&geom)? {
        ValidationStatus::Valid => {
            let mut segment = LrsSegment::from_geometry(&geom)?;
            segment.fill_missing_measures();
            Ok(segment)
        }
        ValidationStatus::Invalid => Err(LrsError::InvalidGeometry(format!(
            "{operation} needs a non-empty line with at least two vertices per member"
        ))),
        ValidationStatus::MeasureNotDefined => Err(LrsError::MeasureNotDefined(format!(
            "{operation} needs measured vertices"
        ))),
        ValidationStatus::MeasureNotLinear => Err(LrsError::MeasureNotLinear(format!(
            "{operation} needs measures progressing in one direction"
        ))),
    }
}

/// Load a structurally valid linear geometry, measures optional
fn load_linear(geom: &Geometry, operation: &'static str) -> Result<LrsSegment> {
    require_linear(geom, operation)?;
    if !geom.is_valid() {
        return Err(LrsError::InvalidGeometry(format!(
            "{operation} needs a non-empty line with at least two vertices per member"
        )));
    }
    LrsSegment::from_geometry(geom)
}

fn point_geometry(point: &LrsPoint) -> Geometry {
    Geometry::point(point.to_coord(), point.srid)
}

fn transform_measures(geom: &Geometry, transform: MeasureTransform) -> Result<Geometry> {
    let geom = normalize_measures(geom);
    let mut sink = MeasureTransformSink::new(GeometryBuilder::new(), transform);
    geom.populate(&mut sink)?;
    Ok(sink.into_inner().finish()?)
}

/// Part of `geom` between two measures
///
/// Equal measures give the point at that measure. Multi-line members outside the range are
/// dropped; a single surviving member comes back as a LINESTRING.
pub fn clip(geom: &Geometry, start_m: f64, end_m: f64, tolerance: f64) -> Result<Geometry> {
    #[cfg(feature = "profiling")]
    profiling::scope!("functions::clip");

    let segment = load_measured(geom, "clip")?;
    if start_m == end_m {
        return locate_in_segment(&segment, start_m).map(|p| point_geometry(&p));
    }
    let (lo, hi) = (start_m.min(end_m), start_m.max(end_m));
    let boundaries = (
        locate_in_segment(&segment, lo).ok(),
        locate_in_segment(&segment, hi).ok(),
    );
    clip_segment(segment, start_m, end_m, tolerance, boundaries)?.to_geometry()
}

/// Split `geom` at measure `m` into the part before and the part after it
pub fn split(geom: &Geometry, m: f64) -> Result<(Geometry, Geometry)> {
    let segment = load_measured(geom, "split")?;
    let (first, second) = split_segment(&segment, m)?;
    Ok((first.to_geometry()?, second.to_geometry()?))
}

/// Append `second` to `first`, shifting its measures to continue where `first` ends
pub fn merge(first: &Geometry, second: &Geometry, tolerance: f64) -> Result<Geometry> {
    require_same_srid(first, second)?;
    let a = load_linear(first, "merge")?;
    let b = load_linear(second, "merge")?;
    merge_segments(&a, &b, tolerance)?.to_geometry()
}

/// Recompute measures over arc length from `start_m` (default 0) to `end_m` (default: the
/// planar length)
pub fn populate_measures(
    geom: &Geometry,
    start_m: Option<f64>,
    end_m: Option<f64>,
) -> Result<Geometry> {
    #[cfg(feature = "profiling")]
    profiling::scope!("functions::populate_measures");

    let context = ShapeContext::of(geom, "populate")?;
    let geom = normalize_measures(geom);
    let length = geom.length();
    let mut sink = PopulateMeasureSink::new(
        GeometryBuilder::new(),
        context,
        start_m.unwrap_or(0.0),
        end_m.unwrap_or(length),
        length,
    );
    geom.populate(&mut sink)?;
    Ok(sink.into_inner().finish()?)
}

/// Remove every measure
pub fn reset_measure(geom: &Geometry) -> Result<Geometry> {
    transform_measures(geom, MeasureTransform::Reset)
}

/// Add `offset` to every measure; vertices without one get `offset`
pub fn translate_measure(geom: &Geometry, offset: f64) -> Result<Geometry> {
    transform_measures(geom, MeasureTransform::Translate(offset))
}

/// Multiply every measure by `factor`
pub fn scale_measure(geom: &Geometry, factor: f64) -> Result<Geometry> {
    transform_measures(geom, MeasureTransform::Scale(factor))
}

/// Move every vertex by `(dx, dy)`
pub fn shift_geometry(geom: &Geometry, dx: f64, dy: f64) -> Result<Geometry> {
    let mut sink = ShiftSink::new(GeometryBuilder::new(), dx, dy);
    geom.populate(&mut sink)?;
    Ok(sink.into_inner().finish()?)
}

/// Reverse the traversal of a line or multi-line
pub fn reverse_linear_geometry(geom: &Geometry) -> Result<Geometry> {
    require_linear(geom, "reverse")?;
    let mut sink = ReverseSink::new(GeometryBuilder::new());
    geom.populate(&mut sink)?;
    Ok(sink.into_inner().finish()?)
}

fn end_coord_measure(geom: &Geometry, operation: &'static str, last: bool) -> Result<f64> {
    if geom.is_polygon() {
        return Err(LrsError::type_mismatch(
            operation,
            "POINT, LINESTRING or MULTILINESTRING",
            geom,
        ));
    }
    let geom = normalize_measures(geom);
    let coord = if last {
        geom.last_coord()
    } else {
        geom.first_coord()
    };
    coord
        .map(|c| c.m.unwrap_or(0.0))
        .ok_or_else(|| LrsError::InvalidGeometry(format!("{operation} of an empty geometry")))
}

/// Measure of the first vertex, 0 when it has none
pub fn get_start_measure(geom: &Geometry) -> Result<f64> {
    end_coord_measure(geom, "get_start_measure", false)
}

/// Measure of the last vertex, 0 when it has none
pub fn get_end_measure(geom: &Geometry) -> Result<f64> {
    end_coord_measure(geom, "get_end_measure", true)
}

/// Point at measure `m`; fails when `m` lies outside the line's measures
pub fn locate_at_measure(geom: &Geometry, m: f64) -> Result<Geometry> {
    let segment = load_measured(geom, "locate_at_measure")?;
    locate_in_segment(&segment, m).map(|p| point_geometry(&p))
}

/// Point at planar `distance` along a line or multi-line
pub fn locate_at_distance(geom: &Geometry, distance: f64) -> Result<Geometry> {
    let segment = load_linear(geom, "locate_at_distance")?;
    locate_distance_in_segment(&segment, distance).map(|p| point_geometry(&p))
}

/// Point at planar `distance` from point `from` towards point `to`
pub fn interpolate_between(from: &Geometry, to: &Geometry, distance: f64) -> Result<Geometry> {
    let as_point = |geom: &Geometry| match geom.shape() {
        Shape::Point(Some(coord)) => Ok(LrsPoint::from_coord(*coord, geom.srid())),
        _ => Err(LrsError::type_mismatch("interpolate_between", "POINT", geom)),
    };
    let (a, b) = (as_point(from)?, as_point(to)?);
    interpolate_points(&a, &b, distance).map(|p| point_geometry(&p))
}

/// True when an endpoint of one geometry touches an endpoint of the other within `tolerance`
pub fn is_connected(first: &Geometry, second: &Geometry, tolerance: f64) -> Result<bool> {
    require_same_srid(first, second)?;
    let a = load_linear(first, "is_connected")?;
    let b = load_linear(second, "is_connected")?;
    segments_connected(&a, &b, tolerance)
}

/// Line parallel to the part of `geom` between two measures, `offset` to the left of the
/// direction of increasing measure
pub fn offset(
    geom: &Geometry,
    start_m: f64,
    end_m: f64,
    offset: f64,
    tolerance: f64,
) -> Result<Geometry> {
    #[cfg(feature = "profiling")]
    profiling::scope!("functions::offset");

    let segment = load_measured(geom, "offset")?;
    let (lo, hi) = (start_m.min(end_m), start_m.max(end_m));
    let boundaries = (
        locate_in_segment(&segment, lo).ok(),
        locate_in_segment(&segment, hi).ok(),
    );
    let clipped = clip_segment(segment, start_m, end_m, tolerance, boundaries)?;
    offset_segment(&clipped, offset, tolerance)?.to_geometry()
}

/// Check that measures are present and progress in a single direction
///
/// Polygons are rejected; empty or structurally invalid geometries are
/// [`ValidationStatus::Invalid`].
pub fn validate(geom: &Geometry) -> Result<ValidationStatus> {
    if geom.is_polygon() {
        return Err(LrsError::type_mismatch(
            "validate",
            "POINT, LINESTRING or MULTILINESTRING",
            geom,
        ));
    }
    if geom.is_empty() || !geom.is_valid() {
        return Ok(ValidationStatus::Invalid);
    }
    let geom = normalize_measures(geom);
    let mut validator = MeasureValidator::new();
    geom.populate(&mut validator)?;
    Ok(validator.status())
}
