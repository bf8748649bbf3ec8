//! Small shared helpers

/// Generic function to get environment variable, parsing it to the desired type.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Wrap an angle in degrees into `[0, 360)`
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Measure fraction of `m` between `m1` and `m2`, 0 for a flat segment
#[inline]
pub fn measure_fraction(m1: f64, m2: f64, m: f64) -> f64 {
    if m2 == m1 { 0.0 } else { (m - m1) / (m2 - m1) }
}

/// True when `m` lies between `a` and `b` (inclusive, in either order)
#[inline]
pub fn is_between(a: f64, b: f64, m: f64) -> bool {
    m >= a.min(b) && m <= a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_parses_or_skips() {
        assert_eq!(get_env::<f64>("LRS_UTILS_TEST_UNSET_VARIABLE"), None);
        // PATH is set but is not a number
        assert_eq!(get_env::<f64>("PATH"), None);
        assert!(get_env::<String>("PATH").is_some());
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-12);
        assert!((normalize_degrees(450.0) - 90.0).abs() < 1e-12);
        assert!(normalize_degrees(360.0).abs() < 1e-12);
    }

    #[test]
    fn test_measure_fraction_and_between() {
        assert!((measure_fraction(10.0, 20.0, 15.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(measure_fraction(5.0, 5.0, 5.0), 0.0);
        assert!(is_between(20.0, 10.0, 15.0));
        assert!(is_between(10.0, 20.0, 20.0));
        assert!(!is_between(10.0, 20.0, 20.5));
    }
}
