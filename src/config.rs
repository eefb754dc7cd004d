//! Engine configuration
//!
//! ```toml
//! fallback_zone = 30
//! datum = "ETRS89"
//! hemisphere = "north"
//!
//! [zone_band]
//! min = 28
//! max = 31
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::{Datum, ZoneBand};
use crate::types::Hemisphere;

/// How projected points get their hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HemispherePolicy {
    /// Always north, for deployments that never leave the northern hemisphere
    #[default]
    North,
    /// South for negative latitudes
    FromLatitude,
}

impl HemispherePolicy {
    pub fn resolve(&self, latitude: f64) -> Hemisphere {
        match self {
            HemispherePolicy::North => Hemisphere::N,
            HemispherePolicy::FromLatitude => Hemisphere::from_latitude(latitude),
        }
    }
}

/// Configuration for a `CoordinateEngine`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub zone_band: ZoneBand,
    /// Zone assumed for projected records that carry none
    pub fallback_zone: u8,
    pub datum: Datum,
    pub hemisphere: HemispherePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zone_band: ZoneBand::REGIONAL,
            fallback_zone: 30,
            datum: Datum::ETRS89,
            hemisphere: HemispherePolicy::North,
        }
    }
}

impl EngineConfig {
    /// Every UTM zone, hemisphere from latitude, WGS84
    pub fn worldwide() -> Self {
        Self {
            zone_band: ZoneBand::WORLDWIDE,
            fallback_zone: 31,
            datum: Datum::WGS84,
            hemisphere: HemispherePolicy::FromLatitude,
        }
    }

    /// Parses and validates a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.zone_band.validate()?;
        if !self.zone_band.contains(self.fallback_zone) {
            return Err(Error::Config(format!(
                "fallback zone {} outside zone band {}-{}",
                self.fallback_zone, self.zone_band.min, self.zone_band.max
            )));
        }
        Ok(())
    }
}
