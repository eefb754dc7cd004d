//! Refreshes derived coordinates after a project origin changes
//!
//! Each record's `coordinate_source` names its authoritative representation.
//! That representation is never written; the other two are recomputed from it.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::batch::BatchOutcome;
use crate::engine::CoordinateEngine;
use crate::error::Result;
use crate::projection::ProjectOrigin;
use crate::record::CoordinateRecord;
use crate::types::CoordinateSource;

/// Picks the representation to derive from
///
/// Explicit sources win. `manual` records use the first present of UTM,
/// geographic, local.
pub fn authority(record: &CoordinateRecord) -> Option<CoordinateSource> {
    match record.coordinate_source {
        CoordinateSource::Local => record.has_local().then_some(CoordinateSource::Local),
        CoordinateSource::Utm => record.has_utm().then_some(CoordinateSource::Utm),
        CoordinateSource::Geo => record.has_geo().then_some(CoordinateSource::Geo),
        CoordinateSource::Manual => {
            if record.has_utm() {
                Some(CoordinateSource::Utm)
            } else if record.has_geo() {
                Some(CoordinateSource::Geo)
            } else if record.has_local() {
                Some(CoordinateSource::Local)
            } else {
                None
            }
        }
    }
}

/// Recomputes the non-authoritative representations of one record
pub fn recalculate_record(
    engine: &CoordinateEngine,
    record: &CoordinateRecord,
    origin: &ProjectOrigin,
) -> BatchOutcome {
    let source = match authority(record) {
        Some(source) => source,
        None => return BatchOutcome::Passthrough(record.clone()),
    };

    match derive(engine, record, origin, source) {
        Ok(updated) => BatchOutcome::Transformed(updated),
        Err(e) => {
            warn!(item = %record.label(), source = %source, error = %e, "recalculation failed");
            BatchOutcome::failed(record.clone(), &e)
        }
    }
}

fn derive(
    engine: &CoordinateEngine,
    record: &CoordinateRecord,
    origin: &ProjectOrigin,
    source: CoordinateSource,
) -> Result<CoordinateRecord> {
    let mut result = record.clone();

    match source {
        CoordinateSource::Local => {
            if let Some(local) = record.local() {
                let utm = engine.local_to_projected(local.x, local.y, local.z, Some(origin))?;
                let geo = engine.projected_point_to_geo(&utm)?;
                result.set_projected(utm);
                result.set_geo(geo);
            }
        }
        CoordinateSource::Utm => {
            if let Some((easting, northing)) = record.utm() {
                // A record without zone or hemisphere is taken to share the origin's
                let anchor = engine.origin_projected(origin)?;
                let zone = record.utm_zone.unwrap_or(anchor.zone);
                let hemisphere = record.utm_hemisphere.unwrap_or(anchor.hemisphere);
                let local = engine.projected_to_local_in(
                    easting,
                    northing,
                    Some(zone),
                    Some(hemisphere),
                    Some(origin),
                )?;
                let geo = engine.projected_to_geo_in(easting, northing, zone, hemisphere)?;
                result.set_local_xy(local);
                result.set_geo(geo);
            }
        }
        CoordinateSource::Geo => {
            if let Some(geo) = record.geo() {
                // Stored UTM stays in the point's own zone; local goes through the origin's
                let utm = engine.geo_to_projected(geo.latitude, geo.longitude, None)?;
                let local = engine.geo_to_local(geo.latitude, geo.longitude, Some(origin))?;
                result.set_projected(utm);
                result.set_local_xy(local);
            }
        }
        CoordinateSource::Manual => {}
    }

    Ok(result)
}

/// Summary of a project-wide recalculation
#[derive(Debug, Clone, PartialEq)]
pub struct RecalculationReport {
    pub outcomes: Vec<BatchOutcome>,
    pub total: usize,
    pub updated: usize,
    /// One line per failed record: "item <id>: <reason>"
    pub errors: Vec<String>,
}

impl RecalculationReport {
    /// Output records in input order
    pub fn into_records(self) -> Vec<CoordinateRecord> {
        self.outcomes.into_iter().map(BatchOutcome::into_record).collect()
    }
}

/// Recalculates every record of a project against its origin
pub fn recalculate_project(
    engine: &CoordinateEngine,
    records: &[CoordinateRecord],
    origin: &ProjectOrigin,
) -> RecalculationReport {
    let outcomes: Vec<BatchOutcome> = records
        .par_iter()
        .map(|record| recalculate_record(engine, record, origin))
        .collect();

    let updated = outcomes.iter().filter(|o| o.is_transformed()).count();
    let errors: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            BatchOutcome::Failed { record, reason } => Some(format!("item {}: {}", record.label(), reason)),
            _ => None,
        })
        .collect();

    info!(
        latitude = origin.latitude,
        longitude = origin.longitude,
        rotation = origin.rotation_degrees,
        total = records.len(),
        updated,
        failed = errors.len(),
        "recalculated project coordinates"
    );

    RecalculationReport {
        total: records.len(),
        updated,
        errors,
        outcomes,
    }
}
