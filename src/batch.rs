//! Applies one conversion across many records
//!
//! One bad record never fails the batch. Every input yields exactly one
//! outcome, in input order.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::CoordinateEngine;
use crate::error::{Error, Result};
use crate::projection::ProjectOrigin;
use crate::record::CoordinateRecord;
use crate::types::Hemisphere;

/// Which conversion a batch applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    LocalToUtm,
    UtmToLocal,
    GeoToUtm,
    UtmToGeo,
}

impl TransformMode {
    pub const ALL: [TransformMode; 4] = [
        TransformMode::LocalToUtm,
        TransformMode::UtmToLocal,
        TransformMode::GeoToUtm,
        TransformMode::UtmToGeo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformMode::LocalToUtm => "local_to_utm",
            TransformMode::UtmToLocal => "utm_to_local",
            TransformMode::GeoToUtm => "geo_to_utm",
            TransformMode::UtmToGeo => "utm_to_geo",
        }
    }

    /// Whether the conversion goes through a project origin
    pub fn requires_origin(&self) -> bool {
        matches!(self, TransformMode::LocalToUtm | TransformMode::UtmToLocal)
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TransformMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidRecord(format!("Unknown transform mode: {}", s)))
    }
}

/// Result of converting one record
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Target fields were recomputed
    Transformed(CoordinateRecord),
    /// Inputs were missing; the record is unchanged
    Passthrough(CoordinateRecord),
    /// The conversion failed; the record is unchanged apart from `transform_error`
    Failed { record: CoordinateRecord, reason: String },
}

impl BatchOutcome {
    /// Builds a `Failed` outcome, annotating the untouched original
    pub fn failed(mut record: CoordinateRecord, error: &Error) -> Self {
        let reason = error.to_string();
        record.transform_error = Some(reason.clone());
        BatchOutcome::Failed { record, reason }
    }

    pub fn record(&self) -> &CoordinateRecord {
        match self {
            BatchOutcome::Transformed(record)
            | BatchOutcome::Passthrough(record)
            | BatchOutcome::Failed { record, .. } => record,
        }
    }

    pub fn into_record(self) -> CoordinateRecord {
        match self {
            BatchOutcome::Transformed(record)
            | BatchOutcome::Passthrough(record)
            | BatchOutcome::Failed { record, .. } => record,
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self, BatchOutcome::Transformed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }
}

/// Outcomes of a batch plus their tallies
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<BatchOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn transformed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_transformed()).count()
    }

    pub fn passthrough(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, BatchOutcome::Passthrough(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Output records in input order
    pub fn into_records(self) -> Vec<CoordinateRecord> {
        self.outcomes.into_iter().map(BatchOutcome::into_record).collect()
    }
}

/// Converts every record with `mode`
///
/// Origin-based modes pass every record through unchanged when `origin` is
/// `None`.
pub fn apply_batch(
    engine: &CoordinateEngine,
    items: &[CoordinateRecord],
    mode: TransformMode,
    origin: Option<&ProjectOrigin>,
) -> Vec<BatchOutcome> {
    if mode.requires_origin() && origin.is_none() {
        debug!(mode = %mode, items = items.len(), "no project origin; passing batch through");
        return items.iter().cloned().map(BatchOutcome::Passthrough).collect();
    }

    let outcomes: Vec<BatchOutcome> = items
        .par_iter()
        .map(|item| apply_one(engine, item, mode, origin))
        .collect();

    let report = BatchReport::new(outcomes);
    info!(
        mode = %mode,
        total = report.len(),
        transformed = report.transformed(),
        passthrough = report.passthrough(),
        failed = report.failed(),
        "applied coordinate batch"
    );
    report.outcomes
}

/// Like `apply_batch`, keeping the tallies
pub fn apply_batch_report(
    engine: &CoordinateEngine,
    items: &[CoordinateRecord],
    mode: TransformMode,
    origin: Option<&ProjectOrigin>,
) -> BatchReport {
    BatchReport::new(apply_batch(engine, items, mode, origin))
}

/// Converts one record
pub fn apply_one(
    engine: &CoordinateEngine,
    item: &CoordinateRecord,
    mode: TransformMode,
    origin: Option<&ProjectOrigin>,
) -> BatchOutcome {
    let mut result = item.clone();

    let applied = match mode {
        TransformMode::LocalToUtm => match item.local() {
            Some(local) => engine
                .local_to_projected(local.x, local.y, local.z, origin)
                .map(|utm| result.set_projected(utm)),
            None => return BatchOutcome::Passthrough(result),
        },
        TransformMode::UtmToLocal => match item.utm() {
            Some((easting, northing)) => engine
                .projected_to_local_in(easting, northing, item.utm_zone, item.utm_hemisphere, origin)
                .map(|local| result.set_local_xy(local)),
            None => return BatchOutcome::Passthrough(result),
        },
        TransformMode::GeoToUtm => match item.geo() {
            Some(geo) => engine
                .geo_to_projected(geo.latitude, geo.longitude, item.utm_zone)
                .map(|utm| result.set_projected(utm)),
            None => return BatchOutcome::Passthrough(result),
        },
        TransformMode::UtmToGeo => match item.utm() {
            Some((easting, northing)) => {
                let zone = item.utm_zone.unwrap_or(engine.config().fallback_zone);
                let hemisphere = item.utm_hemisphere.unwrap_or(Hemisphere::N);
                engine
                    .projected_to_geo_in(easting, northing, zone, hemisphere)
                    .map(|geo| result.set_geo(geo))
            }
            None => return BatchOutcome::Passthrough(result),
        },
    };

    match applied {
        Ok(()) => BatchOutcome::Transformed(result),
        Err(e) => {
            warn!(item = %item.label(), mode = %mode, error = %e, "coordinate transform failed");
            BatchOutcome::failed(item.clone(), &e)
        }
    }
}
