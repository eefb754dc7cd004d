use crate::error::{Error, Result};
use crate::projection::coordinate::GeographicPoint;
use crate::projection::datum::Datum;
use crate::projection::tmerc::TransverseMercator;
use crate::projection::zone::central_meridian;
use crate::types::Hemisphere;

/// UTM scale factor on the central meridian
pub const UTM_SCALE_FACTOR: f64 = 0.9996;

/// UTM false easting in meters
pub const UTM_FALSE_EASTING: f64 = 500_000.0;

/// A forward/inverse projection pair for one UTM zone
///
/// Implementations are pure over their inputs and shared across threads.
pub trait ZoneProjection: Send + Sync {
    /// Zone this projection serves
    fn zone(&self) -> u8;

    /// Projects a geographic point to (easting, northing)
    fn forward(&self, point: GeographicPoint, hemisphere: Hemisphere) -> Result<(f64, f64)>;

    /// Unprojects (easting, northing) to a geographic point
    fn inverse(&self, easting: f64, northing: f64, hemisphere: Hemisphere) -> Result<GeographicPoint>;
}

/// UTM zone backed by the built-in Krüger series
#[derive(Debug, Clone)]
pub struct UtmZone {
    zone: u8,
    tm: TransverseMercator,
}

impl UtmZone {
    /// Creates the projection for `zone` on the datum's ellipsoid
    pub fn new(zone: u8, datum: Datum) -> Self {
        let tm = TransverseMercator::new(
            datum.ellipsoid(),
            central_meridian(zone),
            UTM_SCALE_FACTOR,
            UTM_FALSE_EASTING,
        );
        Self { zone, tm }
    }

    /// Returns the central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        self.tm.central_meridian()
    }
}

impl ZoneProjection for UtmZone {
    fn zone(&self) -> u8 {
        self.zone
    }

    fn forward(&self, point: GeographicPoint, hemisphere: Hemisphere) -> Result<(f64, f64)> {
        point.validate()?;
        let (easting, northing) = self.tm.forward(point.latitude, point.longitude, hemisphere.false_northing());
        ensure_finite("projection", easting, northing)?;
        Ok((easting, northing))
    }

    fn inverse(&self, easting: f64, northing: f64, hemisphere: Hemisphere) -> Result<GeographicPoint> {
        ensure_finite("projected input", easting, northing)?;
        let (latitude, longitude) = self.tm.inverse(easting, northing, hemisphere.false_northing());
        ensure_finite("inverse projection", latitude, longitude)?;
        Ok(GeographicPoint::new(latitude, longitude))
    }
}

pub(crate) fn ensure_finite(what: &str, a: f64, b: f64) -> Result<()> {
    if a.is_finite() && b.is_finite() {
        Ok(())
    } else {
        Err(Error::transform(format!("{} produced non-finite values ({}, {})", what, a, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zone_central_meridian() {
        let zone = UtmZone::new(30, Datum::ETRS89);
        assert_eq!(zone.zone(), 30);
        assert_eq!(zone.central_meridian(), -3.0);
    }

    #[test]
    fn test_forward_inverse() {
        let zone = UtmZone::new(30, Datum::ETRS89);
        let madrid = GeographicPoint::new(40.4168, -3.7038);
        let (e, n) = zone.forward(madrid, Hemisphere::N).unwrap();
        assert!(e > 440_000.0 && e < 441_000.0);
        assert!(n > 4_474_000.0 && n < 4_475_000.0);

        let back = zone.inverse(e, n, Hemisphere::N).unwrap();
        assert_abs_diff_eq!(back.latitude, madrid.latitude, epsilon = 1e-10);
        assert_abs_diff_eq!(back.longitude, madrid.longitude, epsilon = 1e-10);
    }

    #[test]
    fn test_forward_rejects_non_finite() {
        let zone = UtmZone::new(30, Datum::ETRS89);
        let result = zone.forward(GeographicPoint::new(f64::NAN, -3.0), Hemisphere::N);
        assert!(matches!(result, Err(Error::TransformFailure(_))));
    }

    #[test]
    fn test_inverse_rejects_non_finite() {
        let zone = UtmZone::new(30, Datum::ETRS89);
        let result = zone.inverse(f64::INFINITY, 4_000_000.0, Hemisphere::N);
        assert!(matches!(result, Err(Error::TransformFailure(_))));
    }
}
