use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geoframe::{
    apply_batch_report, parse_coordinates, recalculate_project, CoordinateEngine, CoordinateKind,
    CoordinateRecord, EngineConfig, Error, Hemisphere, ProjectOrigin, Result, TransformMode,
};

/// Convert project coordinates between local, UTM and geographic frames
#[derive(Debug, Parser)]
#[command(name = "geoframe", version)]
struct Cli {
    /// TOML engine configuration
    #[arg(long, global = true, env = "GEOFRAME_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a single point
    Convert {
        /// local_to_utm, utm_to_local, geo_to_utm or utm_to_geo
        mode: TransformMode,
        /// x, easting or latitude
        #[arg(long, allow_negative_numbers = true)]
        a: f64,
        /// y, northing or longitude
        #[arg(long, allow_negative_numbers = true)]
        b: f64,
        /// Local elevation
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z: f64,
        /// UTM zone
        #[arg(long)]
        zone: Option<u8>,
        /// UTM hemisphere, N or S
        #[arg(long)]
        hemisphere: Option<Hemisphere>,
        #[command(flatten)]
        origin: OriginArgs,
    },
    /// Convert a JSON array of records
    Batch {
        mode: TransformMode,
        /// JSON file, or - for stdin
        input: PathBuf,
        #[command(flatten)]
        origin: OriginArgs,
    },
    /// Refresh derived coordinates of a JSON array of records
    Recalculate {
        /// JSON file, or - for stdin
        input: PathBuf,
        #[command(flatten)]
        origin: OriginArgs,
    },
    /// Parse a CSV/TXT coordinate file into records
    Import {
        /// Delimited file, or - for stdin
        input: PathBuf,
        /// local, utm or geo
        #[arg(long)]
        kind: CoordinateKind,
    },
}

#[derive(Debug, Args)]
struct OriginArgs {
    /// Origin latitude
    #[arg(long, allow_negative_numbers = true)]
    origin_lat: Option<f64>,
    /// Origin longitude
    #[arg(long, allow_negative_numbers = true)]
    origin_lon: Option<f64>,
    /// Counter-clockwise rotation of the local axes in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotation: f64,
}

impl OriginArgs {
    fn origin(&self) -> Option<ProjectOrigin> {
        match (self.origin_lat, self.origin_lon) {
            (Some(lat), Some(lon)) => Some(ProjectOrigin::new(lat, lon, self.rotation)),
            _ => None,
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn read_records(path: &Path) -> Result<Vec<CoordinateRecord>> {
    Ok(serde_json::from_str(&read_input(path)?)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn convert(
    engine: &CoordinateEngine,
    mode: TransformMode,
    (a, b, z): (f64, f64, f64),
    (zone, hemisphere): (Option<u8>, Option<Hemisphere>),
    origin: Option<&ProjectOrigin>,
) -> Result<Value> {
    let value = match mode {
        TransformMode::LocalToUtm => serde_json::to_value(engine.local_to_projected(a, b, z, origin)?)?,
        TransformMode::UtmToLocal => {
            serde_json::to_value(engine.projected_to_local_in(a, b, zone, hemisphere, origin)?)?
        }
        TransformMode::GeoToUtm => serde_json::to_value(engine.geo_to_projected(a, b, zone)?)?,
        TransformMode::UtmToGeo => {
            let zone = zone.unwrap_or(engine.config().fallback_zone);
            let hemisphere = hemisphere.unwrap_or(Hemisphere::N);
            serde_json::to_value(engine.projected_to_geo_in(a, b, zone, hemisphere)?)?
        }
    };
    Ok(value)
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = CoordinateEngine::new(config)?;

    match cli.command {
        Command::Convert { mode, a, b, z, zone, hemisphere, origin } => {
            print_json(&convert(&engine, mode, (a, b, z), (zone, hemisphere), origin.origin().as_ref())?)
        }
        Command::Batch { mode, input, origin } => {
            let records = read_records(&input)?;
            let report = apply_batch_report(&engine, &records, mode, origin.origin().as_ref());
            info!(
                transformed = report.transformed(),
                passthrough = report.passthrough(),
                failed = report.failed(),
                "batch complete"
            );
            print_json(&report.into_records())
        }
        Command::Recalculate { input, origin } => {
            let origin = origin.origin().ok_or(Error::MissingOrigin)?;
            let records = read_records(&input)?;
            let report = recalculate_project(&engine, &records, &origin);
            for error in &report.errors {
                tracing::warn!("{}", error);
            }
            info!(total = report.total, updated = report.updated, "recalculation complete");
            print_json(&report.into_records())
        }
        Command::Import { input, kind } => {
            let result = parse_coordinates(&read_input(&input)?)?;
            for error in &result.errors {
                tracing::warn!("{}", error);
            }
            info!(rows = result.rows.len(), skipped = result.errors.len(), kind = %kind, "import parsed");
            print_json(&result.to_records(kind))
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    run(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_args(args: &[&str]) -> Value {
        let cli = Cli::try_parse_from(args).unwrap();
        let engine = CoordinateEngine::new(EngineConfig::default()).unwrap();
        match cli.command {
            Command::Convert { mode, a, b, z, zone, hemisphere, origin } => {
                convert(&engine, mode, (a, b, z), (zone, hemisphere), origin.origin().as_ref()).unwrap()
            }
            other => panic!("expected convert, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_utm_to_geo_southern() {
        let args = ["geoframe", "convert", "utm_to_geo", "--a", "500000", "--b", "6000000", "--zone", "30"];
        let north = convert_args(&args);
        assert!(north["latitude"].as_f64().unwrap() > 0.0);

        let mut south_args = args.to_vec();
        south_args.extend(["--hemisphere", "S"]);
        let south = convert_args(&south_args);
        let latitude = south["latitude"].as_f64().unwrap();
        assert!(latitude < -35.0 && latitude > -37.0);
        assert!((south["longitude"].as_f64().unwrap() + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_convert_geo_to_utm_negative_longitude() {
        let value = convert_args(&["geoframe", "convert", "geo_to_utm", "--a", "40.4168", "--b", "-3.7038"]);
        assert_eq!(value["zone"], 30);
        assert_eq!(value["hemisphere"], "N");
    }
}
