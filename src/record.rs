//! Records carrying up to three coordinate representations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::projection::{GeographicPoint, LocalPoint, ProjectedPoint};
use crate::types::{CoordinateSource, Hemisphere};

/// A stored entity (photo, gallery image, incident) as seen by the engine
///
/// Every coordinate field is optional. Fields the engine does not know about
/// are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoordinateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub project_x: Option<f64>,
    #[serde(default)]
    pub project_y: Option<f64>,
    #[serde(default)]
    pub project_z: Option<f64>,

    #[serde(default)]
    pub utm_easting: Option<f64>,
    #[serde(default)]
    pub utm_northing: Option<f64>,
    #[serde(default)]
    pub utm_zone: Option<u8>,
    #[serde(default)]
    pub utm_hemisphere: Option<Hemisphere>,
    #[serde(default)]
    pub utm_datum: Option<String>,

    #[serde(default)]
    pub geo_latitude: Option<f64>,
    #[serde(default)]
    pub geo_longitude: Option<f64>,

    #[serde(default)]
    pub coordinate_source: CoordinateSource,

    /// Set when a transform of this record failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_error: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CoordinateRecord {
    /// Local (x, y, z) when x and y are present; z defaults to 0
    pub fn local(&self) -> Option<LocalPoint> {
        match (self.project_x, self.project_y) {
            (Some(x), Some(y)) => Some(LocalPoint::new_3d(x, y, self.project_z.unwrap_or(0.0))),
            _ => None,
        }
    }

    /// (easting, northing) when both are present
    pub fn utm(&self) -> Option<(f64, f64)> {
        self.utm_easting.zip(self.utm_northing)
    }

    /// Geographic position when both components are present
    pub fn geo(&self) -> Option<GeographicPoint> {
        match (self.geo_latitude, self.geo_longitude) {
            (Some(latitude), Some(longitude)) => Some(GeographicPoint::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn has_local(&self) -> bool {
        self.local().is_some()
    }

    pub fn has_utm(&self) -> bool {
        self.utm().is_some()
    }

    pub fn has_geo(&self) -> bool {
        self.geo().is_some()
    }

    /// Writes every UTM field
    pub fn set_projected(&mut self, point: ProjectedPoint) {
        self.utm_easting = Some(point.easting);
        self.utm_northing = Some(point.northing);
        self.utm_zone = Some(point.zone);
        self.utm_hemisphere = Some(point.hemisphere);
        self.utm_datum = Some(point.datum);
    }

    /// Writes local x and y; z is left alone
    pub fn set_local_xy(&mut self, point: LocalPoint) {
        self.project_x = Some(point.x);
        self.project_y = Some(point.y);
    }

    pub fn set_geo(&mut self, point: GeographicPoint) {
        self.geo_latitude = Some(point.latitude);
        self.geo_longitude = Some(point.longitude);
    }

    /// Short label for log lines and error reports
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => "?".to_string(),
        }
    }
}
