use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Hemisphere;

/// A WGS84/ETRS89 geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeographicPoint {
    /// Creates a new geographic point
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Checks that both components are finite and within range
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(Error::transform(format!(
                "non-finite geographic coordinate ({}, {})",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::transform(format!("latitude {} out of range", self.latitude)));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::transform(format!("longitude {} out of range", self.longitude)));
        }
        Ok(())
    }
}

/// A UTM position within one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub easting: f64,
    pub northing: f64,
    pub zone: u8,
    pub hemisphere: Hemisphere,
    pub datum: String,
}

/// A position in a project's local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
    /// Elevation, carried through untouched
    pub z: f64,
}

impl LocalPoint {
    /// Creates a new 2D local point (z = 0.0)
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Creates a new 3D local point
    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Anchors a project's local frame on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectOrigin {
    pub latitude: f64,
    pub longitude: f64,
    /// Counter-clockwise rotation of the local axes, in degrees
    #[serde(default)]
    pub rotation_degrees: f64,
}

impl ProjectOrigin {
    /// Creates a new origin
    pub fn new(latitude: f64, longitude: f64, rotation_degrees: f64) -> Self {
        Self { latitude, longitude, rotation_degrees }
    }

    /// Returns the origin as a geographic point
    pub fn position(&self) -> GeographicPoint {
        GeographicPoint::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_validate() {
        assert!(GeographicPoint::new(40.4168, -3.7038).validate().is_ok());
        assert!(GeographicPoint::new(90.0, 180.0).validate().is_ok());
        assert!(GeographicPoint::new(91.0, 0.0).validate().is_err());
        assert!(GeographicPoint::new(0.0, -180.5).validate().is_err());
        assert!(GeographicPoint::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_origin_rotation_defaults_to_zero() {
        let origin: ProjectOrigin =
            serde_json::from_str(r#"{"latitude": 40.0, "longitude": -3.0}"#).unwrap();
        assert_eq!(origin.rotation_degrees, 0.0);
        assert_eq!(origin.position(), GeographicPoint::new(40.0, -3.0));
    }

    #[test]
    fn test_local_point_constructors() {
        assert_eq!(LocalPoint::new(1.0, 2.0).z, 0.0);
        assert_eq!(LocalPoint::new_3d(1.0, 2.0, 3.0).z, 3.0);
    }
}
