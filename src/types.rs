//! Core value types shared across geoframe

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Hemisphere of a UTM coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hemisphere {
    /// Northern hemisphere, false northing 0 m
    #[default]
    N,
    /// Southern hemisphere, false northing 10 000 000 m
    S,
}

impl Hemisphere {
    /// Derives the hemisphere from the sign of a latitude
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude < 0.0 {
            Hemisphere::S
        } else {
            Hemisphere::N
        }
    }

    /// Returns the false northing in meters
    pub fn false_northing(&self) -> f64 {
        match self {
            Hemisphere::N => 0.0,
            Hemisphere::S => 10_000_000.0,
        }
    }

    /// Returns the single-letter tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::N => "N",
            Hemisphere::S => "S",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hemisphere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" | "n" => Ok(Hemisphere::N),
            "S" | "s" => Ok(Hemisphere::S),
            other => Err(Error::InvalidRecord(format!("Unknown hemisphere: {}", other))),
        }
    }
}

/// Which representation of a record is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSource {
    Local,
    Utm,
    Geo,
    #[default]
    Manual,
}

impl CoordinateSource {
    /// Returns the lowercase tag
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateSource::Local => "local",
            CoordinateSource::Utm => "utm",
            CoordinateSource::Geo => "geo",
            CoordinateSource::Manual => "manual",
        }
    }
}

impl fmt::Display for CoordinateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(CoordinateSource::Local),
            "utm" => Ok(CoordinateSource::Utm),
            "geo" => Ok(CoordinateSource::Geo),
            "manual" => Ok(CoordinateSource::Manual),
            other => Err(Error::InvalidRecord(format!("Unknown coordinate source: {}", other))),
        }
    }
}

/// Rounds to `decimals` places, half away from zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Millimeter precision for projected coordinates
pub const PROJECTED_DECIMALS: i32 = 3;

/// About 1 mm at the equator
pub const GEOGRAPHIC_DECIMALS: i32 = 8;

/// Local design units may be sub-meter
pub const LOCAL_DECIMALS: i32 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hemisphere_from_latitude() {
        assert_eq!(Hemisphere::from_latitude(40.0), Hemisphere::N);
        assert_eq!(Hemisphere::from_latitude(0.0), Hemisphere::N);
        assert_eq!(Hemisphere::from_latitude(-0.5), Hemisphere::S);
    }

    #[test]
    fn test_false_northing() {
        assert_eq!(Hemisphere::N.false_northing(), 0.0);
        assert_eq!(Hemisphere::S.false_northing(), 10_000_000.0);
    }

    #[test]
    fn test_coordinate_source_parse() {
        assert_eq!("UTM".parse::<CoordinateSource>().unwrap(), CoordinateSource::Utm);
        assert_eq!(" local ".parse::<CoordinateSource>().unwrap(), CoordinateSource::Local);
        assert!("gps".parse::<CoordinateSource>().is_err());
    }

    #[test]
    fn test_coordinate_source_serde() {
        let json = serde_json::to_string(&CoordinateSource::Geo).unwrap();
        assert_eq!(json, "\"geo\"");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-1.23449, 3), -1.234);
        assert_eq!(round_to(440291.38449, 3), 440291.384);
    }
}
