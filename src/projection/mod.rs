//! Coordinate reference systems and the conversions between them

pub mod coordinate;
pub mod datum;
pub mod local;
pub mod tmerc;
pub mod transformer;
pub mod zone;

#[cfg(feature = "libproj")]
pub mod custom;

pub use coordinate::{GeographicPoint, LocalPoint, ProjectOrigin, ProjectedPoint};
pub use datum::{Datum, Ellipsoid};
pub use transformer::{UtmZone, ZoneProjection};
pub use zone::{select_zone, ZoneBand};

#[cfg(feature = "libproj")]
pub use custom::{ProjZone, ProjectionBuilder};
