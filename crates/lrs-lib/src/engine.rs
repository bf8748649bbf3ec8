//! High-level facade over the function surface

use crate::functions;
use crate::utils::get_env;
use crate::{Result, ValidationStatus};
use lrs_geometry::Geometry;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the LRS engine
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Distance below which two vertices count as the same place.
    /// Used by clip / offset to skip near-duplicate boundary vertices and decide on bend
    /// midpoints, and by merge / connectivity as a per-axis endpoint tolerance.
    /// Default: 0.5
    pub tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self { tolerance: 0.5 }
    }
}

impl Config {
    /// Default configuration overridden by `LRS_TOLERANCE` when set and parseable
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(tolerance) = get_env::<f64>("LRS_TOLERANCE") {
            tracing::debug!("Using tolerance {tolerance} from LRS_TOLERANCE");
            config.tolerance = tolerance;
        }
        config
    }
}

/// Entry point exposing every LRS operation with the configured tolerance
///
/// The engine holds configuration only; each call works on fresh state and the engine can be
/// shared freely between threads.
#[derive(Clone, Debug, Default)]
pub struct LrsEngine {
    /// Configuration settings
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LrsEngine {
    /// Create a new engine
    pub fn new(config: Config) -> Self {
        tracing::debug!("Creating LRS engine with tolerance {}", config.tolerance);
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clip(&self, geom: &Geometry, start_m: f64, end_m: f64) -> Result<Geometry> {
        functions::clip(geom, start_m, end_m, self.config.tolerance)
    }

    pub fn split(&self, geom: &Geometry, m: f64) -> Result<(Geometry, Geometry)> {
        functions::split(geom, m)
    }

    pub fn merge(&self, first: &Geometry, second: &Geometry) -> Result<Geometry> {
        functions::merge(first, second, self.config.tolerance)
    }

    pub fn populate_measures(
        &self,
        geom: &Geometry,
        start_m: Option<f64>,
        end_m: Option<f64>,
    ) -> Result<Geometry> {
        functions::populate_measures(geom, start_m, end_m)
    }

    pub fn reset_measure(&self, geom: &Geometry) -> Result<Geometry> {
        functions::reset_measure(geom)
    }

    pub fn translate_measure(&self, geom: &Geometry, offset: f64) -> Result<Geometry> {
        functions::translate_measure(geom, offset)
    }

    pub fn scale_measure(&self, geom: &Geometry, factor: f64) -> Result<Geometry> {
        functions::scale_measure(geom, factor)
    }

    pub fn shift_geometry(&self, geom: &Geometry, dx: f64, dy: f64) -> Result<Geometry> {
        functions::shift_geometry(geom, dx, dy)
    }

    pub fn reverse_linear_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        functions::reverse_linear_geometry(geom)
    }

    pub fn get_start_measure(&self, geom: &Geometry) -> Result<f64> {
        functions::get_start_measure(geom)
    }

    pub fn get_end_measure(&self, geom: &Geometry) -> Result<f64> {
        functions::get_end_measure(geom)
    }

    pub fn locate_at_measure(&self, geom: &Geometry, m: f64) -> Result<Geometry> {
        functions::locate_at_measure(geom, m)
    }

    pub fn locate_at_distance(&self, geom: &Geometry, distance: f64) -> Result<Geometry> {
        functions::locate_at_distance(geom, distance)
    }

    pub fn interpolate_between(
        &self,
        from: &Geometry,
        to: &Geometry,
        distance: f64,
    ) -> Result<Geometry> {
        functions::interpolate_between(from, to, distance)
    }

    pub fn is_connected(&self, first: &Geometry, second: &Geometry) -> Result<bool> {
        functions::is_connected(first, second, self.config.tolerance)
    }

    pub fn offset(
        &self,
        geom: &Geometry,
        start_m: f64,
        end_m: f64,
        offset: f64,
    ) -> Result<Geometry> {
        functions::offset(geom, start_m, end_m, offset, self.config.tolerance)
    }

    pub fn validate(&self, geom: &Geometry) -> Result<ValidationStatus> {
        functions::validate(geom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom(wkt: &str) -> Geometry {
        Geometry::from_wkt(wkt, 0).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!((config.tolerance - 0.5).abs() < f64::EPSILON);
        assert_eq!(LrsEngine::default().config(), &config);
    }

    #[test]
    fn test_from_env_without_variable_is_default() {
        // Only meaningful when the variable is not set in the test environment
        if std::env::var("LRS_TOLERANCE").is_err() {
            assert_eq!(Config::from_env(), Config::default());
        }
    }

    #[test]
    fn test_engine_uses_configured_tolerance() {
        let a = geom("LINESTRING(0 0 NULL 0, 1 0 NULL 1)");
        let b = geom("LINESTRING(1.3 0 NULL 1, 2 0 NULL 2)");

        let strict = LrsEngine::new(Config { tolerance: 0.1 });
        assert!(!strict.is_connected(&a, &b).unwrap());

        let loose = LrsEngine::new(Config::default());
        assert!(loose.is_connected(&a, &b).unwrap());
    }

    #[test]
    fn test_engine_round_trip() {
        let engine = LrsEngine::new(Config::default());
        let line = geom("LINESTRING(0 0, 10 0)");
        let populated = engine.populate_measures(&line, None, None).unwrap();
        assert_eq!(engine.validate(&populated).unwrap(), ValidationStatus::Valid);

        let clipped = engine.clip(&populated, 2.5, 7.5).unwrap();
        assert_eq!(clipped.to_wkt(), "LINESTRING(2.5 0 NULL 2.5, 7.5 0 NULL 7.5)");
        assert_eq!(engine.get_end_measure(&clipped).unwrap(), 7.5);

        let parallel = engine.offset(&populated, 0.0, 10.0, 1.0).unwrap();
        assert_eq!(parallel.num_points(), 2);
    }
}
