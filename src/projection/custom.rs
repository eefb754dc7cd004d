//! libproj-backed zone projections, enabled with the `libproj` feature

use std::sync::Mutex;

use proj::Proj;

use crate::error::{Error, Result};
use crate::projection::coordinate::GeographicPoint;
use crate::projection::datum::Datum;
use crate::projection::transformer::{ensure_finite, ZoneProjection};
use crate::types::Hemisphere;

/// UTM zone projection delegating to libproj
///
/// `Proj` handles are not `Sync`, so each hemisphere sits behind a mutex.
/// `Proj::project` works in radians on the geographic side.
pub struct ProjZone {
    zone: u8,
    north: Mutex<Proj>,
    south: Mutex<Proj>,
    definition: String,
}

impl ProjZone {
    /// Creates the projection for `zone` on the given datum
    pub fn new(zone: u8, datum: Datum) -> Result<Self> {
        let north = ProjectionBuilder::utm(zone, datum, Hemisphere::N);
        let definition = north.definition();
        let south = ProjectionBuilder::utm(zone, datum, Hemisphere::S);

        Ok(Self {
            zone,
            north: Mutex::new(north.build()?),
            south: Mutex::new(south.build()?),
            definition,
        })
    }

    /// Returns the northern PROJ definition string
    pub fn definition(&self) -> &str {
        &self.definition
    }

    fn with_proj<T>(&self, hemisphere: Hemisphere, f: impl FnOnce(&Proj) -> Result<T>) -> Result<T> {
        let handle = match hemisphere {
            Hemisphere::N => &self.north,
            Hemisphere::S => &self.south,
        };
        let proj = handle
            .lock()
            .map_err(|_| Error::transform("libproj handle poisoned"))?;
        f(&proj)
    }
}

impl ZoneProjection for ProjZone {
    fn zone(&self) -> u8 {
        self.zone
    }

    fn forward(&self, point: GeographicPoint, hemisphere: Hemisphere) -> Result<(f64, f64)> {
        point.validate()?;
        let (easting, northing) = self.with_proj(hemisphere, |proj| {
            proj.project((point.longitude.to_radians(), point.latitude.to_radians()), false)
                .map_err(|e| Error::transform(format!("Projection failed: {}", e)))
        })?;
        ensure_finite("projection", easting, northing)?;
        Ok((easting, northing))
    }

    fn inverse(&self, easting: f64, northing: f64, hemisphere: Hemisphere) -> Result<GeographicPoint> {
        ensure_finite("projected input", easting, northing)?;
        let (lon_rad, lat_rad) = self.with_proj(hemisphere, |proj| {
            proj.project((easting, northing), true)
                .map_err(|e| Error::transform(format!("Unprojection failed: {}", e)))
        })?;
        let (latitude, longitude) = (lat_rad.to_degrees(), lon_rad.to_degrees());
        ensure_finite("inverse projection", latitude, longitude)?;
        Ok(GeographicPoint::new(latitude, longitude))
    }
}

/// Builds PROJ4 strings for zone projections
pub struct ProjectionBuilder {
    proj_type: String,
    datum: Datum,
    parameters: Vec<(String, Option<String>)>,
}

impl ProjectionBuilder {
    /// Starts a UTM definition
    pub fn utm(zone: u8, datum: Datum, hemisphere: Hemisphere) -> Self {
        let builder = Self {
            proj_type: "utm".to_string(),
            datum,
            parameters: Vec::new(),
        }
        .parameter("zone", &zone.to_string());

        match hemisphere {
            Hemisphere::N => builder,
            Hemisphere::S => builder.flag("south"),
        }
    }

    /// Adds a `+key=value` parameter
    pub fn parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.push((key.to_string(), Some(value.to_string())));
        self
    }

    /// Adds a bare `+key` flag
    pub fn flag(mut self, key: &str) -> Self {
        self.parameters.push((key.to_string(), None));
        self
    }

    /// Renders the PROJ4 string
    pub fn definition(&self) -> String {
        let mut parts = vec![format!("+proj={}", self.proj_type)];

        for (key, value) in &self.parameters {
            match value {
                Some(value) => parts.push(format!("+{}={}", key, value)),
                None => parts.push(format!("+{}", key)),
            }
        }

        parts.push(self.datum.to_proj_string().to_string());
        parts.push("+units=m +no_defs".to_string());
        parts.join(" ")
    }

    /// Builds the libproj handle
    pub fn build(self) -> Result<Proj> {
        let definition = self.definition();
        Proj::new(&definition)
            .map_err(|e| Error::transform(format!("Failed to create projection {}: {}", definition, e)))
    }
}
