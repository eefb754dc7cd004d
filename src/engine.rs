//! Single-point conversions between local, UTM and geographic coordinates

use std::sync::OnceLock;

use crate::cache::ZoneCache;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::projection::local::{local_to_offset, offset_to_local};
use crate::projection::{
    select_zone, GeographicPoint, LocalPoint, ProjectOrigin, ProjectedPoint,
};
use crate::types::{round_to, Hemisphere, GEOGRAPHIC_DECIMALS, LOCAL_DECIMALS, PROJECTED_DECIMALS};

/// Converts coordinates for one deployment configuration
///
/// Holds the configuration and the zone cache built from it. Every method is a
/// pure function of its arguments, so one engine can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct CoordinateEngine {
    config: EngineConfig,
    cache: ZoneCache,
}

impl CoordinateEngine {
    /// Validates the config and builds the series-backed zone cache
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let cache = ZoneCache::series(config.zone_band, config.datum);
        Ok(Self { config, cache })
    }

    /// Uses a prebuilt cache, which must match the config's band and datum
    pub fn with_cache(config: EngineConfig, cache: ZoneCache) -> Result<Self> {
        config.validate()?;
        if cache.band() != config.zone_band || cache.datum() != config.datum {
            return Err(Error::Config(
                "zone cache does not match the configured band and datum".to_string(),
            ));
        }
        Ok(Self { config, cache })
    }

    /// Process-wide engine with the default regional configuration
    pub fn shared() -> &'static CoordinateEngine {
        static SHARED: OnceLock<CoordinateEngine> = OnceLock::new();
        SHARED.get_or_init(|| {
            let config = EngineConfig::default();
            let cache = ZoneCache::series(config.zone_band, config.datum);
            CoordinateEngine { config, cache }
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ZoneCache {
        &self.cache
    }

    /// Resolves the zone for a longitude, honoring an in-band hint
    pub fn select_zone(&self, longitude: f64, explicit_zone: Option<u8>) -> u8 {
        select_zone(&self.config.zone_band, longitude, explicit_zone)
    }

    /// Geographic to UTM
    ///
    /// The zone is the hint when it lies in the band, otherwise derived from
    /// the longitude and clamped. Easting and northing are rounded to the
    /// millimeter.
    pub fn geo_to_projected(&self, latitude: f64, longitude: f64, zone: Option<u8>) -> Result<ProjectedPoint> {
        let point = GeographicPoint::new(latitude, longitude);
        point.validate()?;

        let zone = self.select_zone(longitude, zone);
        let hemisphere = self.config.hemisphere.resolve(latitude);
        let (easting, northing) = self.cache.get(zone)?.forward(point, hemisphere)?;

        Ok(ProjectedPoint {
            easting: round_to(easting, PROJECTED_DECIMALS),
            northing: round_to(northing, PROJECTED_DECIMALS),
            zone,
            hemisphere,
            datum: self.config.datum.tag().to_string(),
        })
    }

    /// UTM to geographic, assuming the northern hemisphere
    ///
    /// Fails with `InvalidZone` outside the configured band. Southern points
    /// go through [`projected_to_geo_in`](Self::projected_to_geo_in).
    pub fn projected_to_geo(&self, easting: f64, northing: f64, zone: u8) -> Result<GeographicPoint> {
        self.projected_to_geo_in(easting, northing, zone, Hemisphere::N)
    }

    /// UTM to geographic using the point's own zone and hemisphere
    pub fn projected_point_to_geo(&self, point: &ProjectedPoint) -> Result<GeographicPoint> {
        self.projected_to_geo_in(point.easting, point.northing, point.zone, point.hemisphere)
    }

    /// UTM to geographic in an explicit hemisphere
    pub fn projected_to_geo_in(
        &self,
        easting: f64,
        northing: f64,
        zone: u8,
        hemisphere: Hemisphere,
    ) -> Result<GeographicPoint> {
        let geo = self.cache.get(zone)?.inverse(easting, northing, hemisphere)?;
        Ok(GeographicPoint::new(
            round_to(geo.latitude, GEOGRAPHIC_DECIMALS),
            round_to(geo.longitude, GEOGRAPHIC_DECIMALS),
        ))
    }

    /// Projects the origin; its zone is the zone of every point in the project
    pub fn origin_projected(&self, origin: &ProjectOrigin) -> Result<ProjectedPoint> {
        if !origin.rotation_degrees.is_finite() {
            return Err(Error::transform(format!(
                "non-finite origin rotation {}",
                origin.rotation_degrees
            )));
        }
        self.geo_to_projected(origin.latitude, origin.longitude, None)
    }

    /// Local to UTM
    ///
    /// `z` is elevation and passes through untransformed, so it is not part of
    /// the result.
    pub fn local_to_projected(
        &self,
        x: f64,
        y: f64,
        z: f64,
        origin: Option<&ProjectOrigin>,
    ) -> Result<ProjectedPoint> {
        let origin = origin.ok_or(Error::MissingOrigin)?;
        if !x.is_finite() || !y.is_finite() || !z.is_finite() {
            return Err(Error::transform(format!("non-finite local coordinate ({}, {}, {})", x, y, z)));
        }

        let anchor = self.origin_projected(origin)?;
        let (dx, dy) = local_to_offset(x, y, origin.rotation_degrees);

        Ok(ProjectedPoint {
            easting: round_to(anchor.easting + dx, PROJECTED_DECIMALS),
            northing: round_to(anchor.northing + dy, PROJECTED_DECIMALS),
            ..anchor
        })
    }

    /// UTM to local, with the point in the origin's zone and hemisphere
    ///
    /// Elevation cannot be recovered from a projected point; the returned `z`
    /// is always 0.
    pub fn projected_to_local(
        &self,
        easting: f64,
        northing: f64,
        origin: Option<&ProjectOrigin>,
    ) -> Result<LocalPoint> {
        self.projected_to_local_in(easting, northing, None, None, origin)
    }

    /// UTM to local for a point in any zone of the band
    ///
    /// The local frame lives in the origin's zone. A point projected in another
    /// zone or hemisphere is unprojected and reprojected into that frame before
    /// the offset is taken. `None` means the origin's zone or hemisphere.
    pub fn projected_to_local_in(
        &self,
        easting: f64,
        northing: f64,
        zone: Option<u8>,
        hemisphere: Option<Hemisphere>,
        origin: Option<&ProjectOrigin>,
    ) -> Result<LocalPoint> {
        let origin = origin.ok_or(Error::MissingOrigin)?;
        if !easting.is_finite() || !northing.is_finite() {
            return Err(Error::transform(format!(
                "non-finite projected coordinate ({}, {})",
                easting, northing
            )));
        }

        let anchor = self.origin_projected(origin)?;
        let zone = zone.unwrap_or(anchor.zone);
        let hemisphere = hemisphere.unwrap_or(anchor.hemisphere);

        let (easting, northing) = if zone == anchor.zone && hemisphere == anchor.hemisphere {
            (easting, northing)
        } else {
            let geo = self.cache.get(zone)?.inverse(easting, northing, hemisphere)?;
            self.cache.get(anchor.zone)?.forward(geo, anchor.hemisphere)?
        };

        Ok(local_from_anchor(&anchor, origin, easting, northing))
    }

    /// Geographic to local, projecting in the origin's zone
    pub fn geo_to_local(
        &self,
        latitude: f64,
        longitude: f64,
        origin: Option<&ProjectOrigin>,
    ) -> Result<LocalPoint> {
        let origin = origin.ok_or(Error::MissingOrigin)?;
        let point = GeographicPoint::new(latitude, longitude);
        point.validate()?;

        let anchor = self.origin_projected(origin)?;
        let (easting, northing) = self.cache.get(anchor.zone)?.forward(point, anchor.hemisphere)?;

        Ok(local_from_anchor(&anchor, origin, easting, northing))
    }
}

fn local_from_anchor(anchor: &ProjectedPoint, origin: &ProjectOrigin, easting: f64, northing: f64) -> LocalPoint {
    let (x, y) = offset_to_local(
        easting - anchor.easting,
        northing - anchor.northing,
        origin.rotation_degrees,
    );
    LocalPoint::new(round_to(x, LOCAL_DECIMALS), round_to(y, LOCAL_DECIMALS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn engine() -> CoordinateEngine {
        CoordinateEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_geo_to_projected_madrid() {
        let utm = engine().geo_to_projected(40.4168, -3.7038, None).unwrap();
        assert_eq!(utm.zone, 30);
        assert_eq!(utm.hemisphere, Hemisphere::N);
        assert_eq!(utm.datum, "ETRS89");
        assert!(utm.easting > 440_000.0 && utm.easting < 441_000.0);
        assert!(utm.northing > 4_474_000.0 && utm.northing < 4_475_000.0);
        assert_eq!(utm.easting, round_to(utm.easting, 3));
    }

    #[test]
    fn test_geo_to_projected_honors_zone_hint() {
        let engine = engine();
        let hinted = engine.geo_to_projected(40.4168, -3.7038, Some(29)).unwrap();
        let derived = engine.geo_to_projected(40.4168, -3.7038, None).unwrap();
        assert_eq!(hinted.zone, 29);
        assert!(hinted.easting > derived.easting);
    }

    #[test]
    fn test_geo_to_projected_clamps_zone() {
        let utm = engine().geo_to_projected(41.9, 12.5, None).unwrap();
        assert_eq!(utm.zone, 31);
    }

    #[test]
    fn test_geo_to_projected_rejects_bad_latitude() {
        let result = engine().geo_to_projected(95.0, -3.0, None);
        assert!(matches!(result, Err(Error::TransformFailure(_))));
    }

    #[test]
    fn test_projected_to_geo_invalid_zone() {
        let result = engine().projected_to_geo(440_000.0, 4_474_000.0, 33);
        assert!(matches!(result, Err(Error::InvalidZone { zone: 33, min: 28, max: 31 })));
    }

    #[test]
    fn test_geo_round_trip() {
        let engine = engine();
        let utm = engine.geo_to_projected(40.4168, -3.7038, None).unwrap();
        let geo = engine.projected_to_geo(utm.easting, utm.northing, utm.zone).unwrap();
        assert_abs_diff_eq!(geo.latitude, 40.4168, epsilon = 1e-6);
        assert_abs_diff_eq!(geo.longitude, -3.7038, epsilon = 1e-6);
    }

    #[test]
    fn test_southern_hemisphere_policy() {
        let engine = CoordinateEngine::new(EngineConfig::worldwide()).unwrap();
        let utm = engine.geo_to_projected(-33.86, 151.2, None).unwrap();
        assert_eq!(utm.zone, 56);
        assert_eq!(utm.hemisphere, Hemisphere::S);
        assert_eq!(utm.datum, "WGS84");

        let geo = engine.projected_point_to_geo(&utm).unwrap();
        assert_abs_diff_eq!(geo.latitude, -33.86, epsilon = 1e-6);
        assert_abs_diff_eq!(geo.longitude, 151.2, epsilon = 1e-6);
    }

    #[test]
    fn test_local_origin_maps_to_origin() {
        let engine = engine();
        let origin = ProjectOrigin::new(40.4168, -3.7038, 0.0);
        let anchor = engine.geo_to_projected(40.4168, -3.7038, None).unwrap();
        let utm = engine.local_to_projected(0.0, 0.0, 0.0, Some(&origin)).unwrap();
        assert_eq!(utm, anchor);
    }

    #[test]
    fn test_local_rotation_zero_is_translation() {
        let engine = engine();
        let origin = ProjectOrigin::new(40.0, -3.0, 0.0);
        let anchor = engine.origin_projected(&origin).unwrap();
        let utm = engine.local_to_projected(100.0, 200.0, 5.0, Some(&origin)).unwrap();
        assert_abs_diff_eq!(utm.easting - anchor.easting, 100.0, epsilon = 1e-6);
        assert_abs_diff_eq!(utm.northing - anchor.northing, 200.0, epsilon = 1e-6);
    }

    #[test]
    fn test_local_rotation_ninety() {
        let engine = engine();
        let origin = ProjectOrigin::new(40.4168, -3.7038, 90.0);
        let anchor = engine.origin_projected(&origin).unwrap();
        let utm = engine.local_to_projected(10.0, 0.0, 0.0, Some(&origin)).unwrap();
        assert_abs_diff_eq!(utm.easting, anchor.easting, epsilon = 1e-9);
        assert_abs_diff_eq!(utm.northing, anchor.northing + 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_local_round_trip() {
        let engine = engine();
        for &rotation in &[0.0, 90.0, -45.0] {
            let origin = ProjectOrigin::new(40.0, -3.0, rotation);
            let utm = engine.local_to_projected(100.0, 200.0, 5.0, Some(&origin)).unwrap();
            let local = engine.projected_to_local(utm.easting, utm.northing, Some(&origin)).unwrap();
            assert_abs_diff_eq!(local.x, 100.0, epsilon = 1e-3);
            assert_abs_diff_eq!(local.y, 200.0, epsilon = 1e-3);
            assert_eq!(local.z, 0.0);
        }
    }

    #[test]
    fn test_missing_origin() {
        let engine = engine();
        assert!(matches!(
            engine.local_to_projected(1.0, 2.0, 0.0, None),
            Err(Error::MissingOrigin)
        ));
        assert!(matches!(
            engine.projected_to_local(440_000.0, 4_474_000.0, None),
            Err(Error::MissingOrigin)
        ));
    }

    #[test]
    fn test_non_finite_local_input() {
        let origin = ProjectOrigin::new(40.0, -3.0, 0.0);
        let result = engine().local_to_projected(f64::NAN, 2.0, 0.0, Some(&origin));
        assert!(matches!(result, Err(Error::TransformFailure(_))));
    }

    #[test]
    fn test_non_finite_rotation() {
        let origin = ProjectOrigin::new(40.0, -3.0, f64::INFINITY);
        let result = engine().local_to_projected(1.0, 2.0, 0.0, Some(&origin));
        assert!(matches!(result, Err(Error::TransformFailure(_))));
    }

    #[test]
    fn test_with_cache_mismatch() {
        let cache = ZoneCache::new(crate::projection::ZoneBand::WORLDWIDE, crate::projection::Datum::ETRS89).unwrap();
        assert!(CoordinateEngine::with_cache(EngineConfig::default(), cache).is_err());
    }

    #[test]
    fn test_local_frame_spans_zone_boundary() {
        let engine = engine();
        // Origin just west of 0°, point about 30 m east of it in zone 31
        let origin = ProjectOrigin::new(40.0, -0.0002, 0.0);
        assert_eq!(engine.origin_projected(&origin).unwrap().zone, 30);

        let from_geo = engine.geo_to_local(40.0, 0.00015, Some(&origin)).unwrap();
        assert!(from_geo.x > 25.0 && from_geo.x < 35.0);
        assert!(from_geo.y.abs() < 2.0);

        let foreign = engine.geo_to_projected(40.0, 0.00015, None).unwrap();
        assert_eq!(foreign.zone, 31);
        let from_utm = engine
            .projected_to_local_in(foreign.easting, foreign.northing, Some(31), None, Some(&origin))
            .unwrap();
        assert_abs_diff_eq!(from_utm.x, from_geo.x, epsilon = 2e-3);
        assert_abs_diff_eq!(from_utm.y, from_geo.y, epsilon = 2e-3);

        let back = engine.local_to_projected(from_geo.x, from_geo.y, 0.0, Some(&origin)).unwrap();
        let geo = engine.projected_point_to_geo(&back).unwrap();
        assert_abs_diff_eq!(geo.latitude, 40.0, epsilon = 1e-6);
        assert_abs_diff_eq!(geo.longitude, 0.00015, epsilon = 1e-6);
    }

    #[test]
    fn test_projected_to_local_in_own_zone_matches_plain() {
        let engine = engine();
        let origin = ProjectOrigin::new(40.4168, -3.7038, 25.0);
        let plain = engine.projected_to_local(440_500.0, 4_474_500.0, Some(&origin)).unwrap();
        let explicit = engine
            .projected_to_local_in(440_500.0, 4_474_500.0, Some(30), Some(Hemisphere::N), Some(&origin))
            .unwrap();
        assert_eq!(plain, explicit);
        assert!(matches!(engine.geo_to_local(40.0, -3.0, None), Err(Error::MissingOrigin)));
    }

    #[test]
    fn test_shared_engine_is_regional() {
        let engine = CoordinateEngine::shared();
        assert_eq!(engine.config(), &EngineConfig::default());
        assert_eq!(engine.cache().len(), 4);
        assert!(std::ptr::eq(engine, CoordinateEngine::shared()));
    }
}
