//! Zone projection cache shared by every conversion

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::projection::{Datum, UtmZone, ZoneBand, ZoneProjection};

/// Immutable map from zone to projection adapter
///
/// Built once for a band; read-only afterwards, so lookups need no locking.
#[derive(Clone)]
pub struct ZoneCache {
    band: ZoneBand,
    datum: Datum,
    zones: BTreeMap<u8, Arc<dyn ZoneProjection>>,
}

impl ZoneCache {
    /// Builds series-backed projections for every zone in the band
    pub fn new(band: ZoneBand, datum: Datum) -> Result<Self> {
        band.validate()?;
        Ok(Self::series(band, datum))
    }

    /// Series-backed cache for a band that is already known to be valid
    pub(crate) fn series(band: ZoneBand, datum: Datum) -> Self {
        let zones = band
            .zones()
            .map(|zone| (zone, Arc::new(UtmZone::new(zone, datum)) as Arc<dyn ZoneProjection>))
            .collect();
        debug!(
            min = band.min,
            max = band.max,
            datum = %datum,
            epsg = datum.utm_epsg(band.min),
            "built zone cache"
        );
        Self { band, datum, zones }
    }

    /// Builds libproj-backed projections for every zone in the band
    #[cfg(feature = "libproj")]
    pub fn with_libproj(band: ZoneBand, datum: Datum) -> Result<Self> {
        use crate::projection::ProjZone;

        Self::build_with(band, datum, |zone| {
            Ok(Arc::new(ProjZone::new(zone, datum)?) as Arc<dyn ZoneProjection>)
        })
    }

    /// Builds the cache from a custom adapter factory
    pub fn build_with<F>(band: ZoneBand, datum: Datum, mut factory: F) -> Result<Self>
    where
        F: FnMut(u8) -> Result<Arc<dyn ZoneProjection>>,
    {
        band.validate()?;

        let mut zones = BTreeMap::new();
        for zone in band.zones() {
            let projection = factory(zone)?;
            if projection.zone() != zone {
                return Err(Error::Config(format!(
                    "adapter for zone {} reports zone {}",
                    zone,
                    projection.zone()
                )));
            }
            debug!(zone, epsg = datum.utm_epsg(zone), "zone projection ready");
            zones.insert(zone, projection);
        }

        debug!(min = band.min, max = band.max, datum = %datum, "built zone cache");

        Ok(Self { band, datum, zones })
    }

    /// Gets the projection for a zone, failing outside the band
    pub fn get(&self, zone: u8) -> Result<&Arc<dyn ZoneProjection>> {
        self.band.check(zone)?;
        self.zones.get(&zone).ok_or(Error::InvalidZone {
            zone,
            min: self.band.min,
            max: self.band.max,
        })
    }

    pub fn band(&self) -> ZoneBand {
        self.band
    }

    pub fn datum(&self) -> Datum {
        self.datum
    }

    /// Returns the number of cached zones
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl fmt::Debug for ZoneCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneCache")
            .field("band", &self.band)
            .field("datum", &self.datum)
            .field("zones", &self.zones.keys().collect::<Vec<_>>())
            .finish()
    }
}
