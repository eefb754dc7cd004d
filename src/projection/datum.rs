use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Reference ellipsoid parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    pub const GRS80: Ellipsoid = Ellipsoid { a: 6_378_137.0, f: 1.0 / 298.257_222_101 };
    pub const WGS84: Ellipsoid = Ellipsoid { a: 6_378_137.0, f: 1.0 / 298.257_223_563 };

    /// First eccentricity
    pub fn eccentricity(&self) -> f64 {
        (self.f * (2.0 - self.f)).sqrt()
    }

    /// Third flattening n = f / (2 - f)
    pub fn third_flattening(&self) -> f64 {
        self.f / (2.0 - self.f)
    }
}

/// Geodetic datums the engine can tag its output with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Datum {
    #[default]
    ETRS89,
    WGS84,
}

impl Datum {
    /// Returns the ellipsoid the datum is defined on
    pub fn ellipsoid(&self) -> Ellipsoid {
        match self {
            Datum::ETRS89 => Ellipsoid::GRS80,
            Datum::WGS84 => Ellipsoid::WGS84,
        }
    }

    /// Returns the tag stored on projected points
    pub fn tag(&self) -> &'static str {
        match self {
            Datum::ETRS89 => "ETRS89",
            Datum::WGS84 => "WGS84",
        }
    }

    /// Converts datum to PROJ string representation
    pub fn to_proj_string(&self) -> &'static str {
        match self {
            Datum::ETRS89 => "+ellps=GRS80",
            Datum::WGS84 => "+datum=WGS84",
        }
    }

    /// EPSG code of the UTM north CRS for `zone`
    pub fn utm_epsg(&self, zone: u8) -> u32 {
        match self {
            Datum::ETRS89 => 25800 + zone as u32,
            Datum::WGS84 => 32600 + zone as u32,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Datum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ETRS89" => Ok(Datum::ETRS89),
            "WGS84" => Ok(Datum::WGS84),
            other => Err(Error::Config(format!("Unsupported datum: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datum_proj_string() {
        assert_eq!(Datum::ETRS89.to_proj_string(), "+ellps=GRS80");
        assert_eq!(Datum::WGS84.to_proj_string(), "+datum=WGS84");
    }

    #[test]
    fn test_datum_epsg() {
        assert_eq!(Datum::ETRS89.utm_epsg(30), 25830);
        assert_eq!(Datum::WGS84.utm_epsg(31), 32631);
    }

    #[test]
    fn test_ellipsoid_parameters() {
        let grs80 = Datum::ETRS89.ellipsoid();
        assert!((grs80.eccentricity() - 0.081_819_191_042_8).abs() < 1e-12);
        assert!((grs80.third_flattening() - 0.001_679_220_386_4).abs() < 1e-12);
    }

    #[test]
    fn test_datum_parse() {
        assert_eq!("etrs89".parse::<Datum>().unwrap(), Datum::ETRS89);
        assert!("NAD27".parse::<Datum>().is_err());
    }
}
