//! geoframe - coordinate conversion for georeferenced project records
//!
//! geoframe converts positions between a project's local frame, UTM
//! (ETRS89 by default) and geographic latitude/longitude, and refreshes the
//! derived representations of whole record sets when a project's origin or
//! rotation changes.
//!
//! # Examples
//!
//! ## Single points
//!
//! ```
//! use geoframe::{CoordinateEngine, EngineConfig, ProjectOrigin};
//!
//! let engine = CoordinateEngine::new(EngineConfig::default())?;
//!
//! let utm = engine.geo_to_projected(40.4168, -3.7038, None)?;
//! assert_eq!(utm.zone, 30);
//!
//! let origin = ProjectOrigin::new(40.4168, -3.7038, 90.0);
//! let point = engine.local_to_projected(10.0, 0.0, 0.0, Some(&origin))?;
//! let local = engine.projected_to_local(point.easting, point.northing, Some(&origin))?;
//! assert!((local.x - 10.0).abs() < 1e-3);
//! # Ok::<(), geoframe::Error>(())
//! ```
//!
//! ## Batches
//!
//! ```
//! use geoframe::{apply_batch, CoordinateEngine, CoordinateRecord, TransformMode};
//!
//! let records = vec![CoordinateRecord {
//!     geo_latitude: Some(41.3874),
//!     geo_longitude: Some(2.1686),
//!     ..Default::default()
//! }];
//!
//! let outcomes = apply_batch(CoordinateEngine::shared(), &records, TransformMode::GeoToUtm, None);
//! assert_eq!(outcomes[0].record().utm_zone, Some(31));
//! ```

pub mod batch;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod import;
pub mod projection;
pub mod recalculate;
pub mod record;
pub mod types;

pub use batch::{apply_batch, apply_batch_report, apply_one, BatchOutcome, BatchReport, TransformMode};
pub use cache::ZoneCache;
pub use config::{EngineConfig, HemispherePolicy};
pub use engine::CoordinateEngine;
pub use error::{Error, Result};
pub use import::{parse_coordinates, parse_coordinates_file, CoordinateKind, ImportResult, ImportRow};
pub use projection::{
    select_zone, Datum, GeographicPoint, LocalPoint, ProjectOrigin, ProjectedPoint, UtmZone, ZoneBand,
    ZoneProjection,
};
pub use recalculate::{recalculate_project, recalculate_record, RecalculationReport};
pub use record::CoordinateRecord;
pub use types::{CoordinateSource, Hemisphere};
