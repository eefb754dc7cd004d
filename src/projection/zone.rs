//! UTM zone selection
//!
//! Zones are clamped into a configured band rather than rejected. The default
//! band 28-31 covers a regional deployment (Iberia and the Canaries); a
//! worldwide deployment configures 1-60.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest valid UTM zone
pub const MIN_UTM_ZONE: u8 = 1;

/// Highest valid UTM zone
pub const MAX_UTM_ZONE: u8 = 60;

/// Inclusive range of zones the engine serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneBand {
    pub min: u8,
    pub max: u8,
}

impl ZoneBand {
    /// Regional default band
    pub const REGIONAL: ZoneBand = ZoneBand { min: 28, max: 31 };

    /// Every UTM zone
    pub const WORLDWIDE: ZoneBand = ZoneBand { min: MIN_UTM_ZONE, max: MAX_UTM_ZONE };

    /// Creates a band, checking it lies inside 1-60 and is ordered
    pub fn new(min: u8, max: u8) -> Result<Self> {
        let band = Self { min, max };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min < MIN_UTM_ZONE || self.max > MAX_UTM_ZONE {
            return Err(Error::Config(format!(
                "zone band {}-{} exceeds UTM zones {}-{}",
                self.min, self.max, MIN_UTM_ZONE, MAX_UTM_ZONE
            )));
        }
        if self.min > self.max {
            return Err(Error::Config(format!(
                "zone band minimum {} is above maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, zone: u8) -> bool {
        (self.min..=self.max).contains(&zone)
    }

    pub fn zones(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }

    /// Clamps a computed zone into the band
    pub fn clamp(&self, zone: i32) -> u8 {
        zone.clamp(self.min as i32, self.max as i32) as u8
    }

    /// Fails with `InvalidZone` when `zone` is outside the band
    pub fn check(&self, zone: u8) -> Result<u8> {
        if self.contains(zone) {
            Ok(zone)
        } else {
            Err(Error::InvalidZone { zone, min: self.min, max: self.max })
        }
    }
}

impl Default for ZoneBand {
    fn default() -> Self {
        Self::REGIONAL
    }
}

/// Standard 6°-wide zone index for a longitude, unclamped
pub fn zone_for_longitude(longitude: f64) -> i32 {
    ((longitude + 180.0) / 6.0).floor() as i32 + 1
}

/// Picks the zone for a longitude
///
/// An explicit zone inside the band wins. Anything else falls back to the
/// longitude formula, clamped into the band.
pub fn select_zone(band: &ZoneBand, longitude: f64, explicit_zone: Option<u8>) -> u8 {
    if let Some(zone) = explicit_zone.filter(|z| band.contains(*z)) {
        return zone;
    }
    band.clamp(zone_for_longitude(longitude))
}

/// Central meridian of a zone in degrees
pub fn central_meridian(zone: u8) -> f64 {
    zone as f64 * 6.0 - 183.0
}
