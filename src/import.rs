//! Coordinate import files
//!
//! Delimited text with a header row. The delimiter is sniffed from the header
//! (`;`, then `,`, else tab) and column names are matched against a list of
//! aliases, so files exported from most survey tools load as-is.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::CoordinateRecord;
use crate::types::CoordinateSource;

const NAME_ALIASES: &[&str] = &["nombre_imagen", "nombre", "imagen", "filename", "file", "name", "photo"];
const X_ALIASES: &[&str] = &["x", "easting", "longitude", "lon", "lng", "project_x"];
const Y_ALIASES: &[&str] = &["y", "northing", "latitude", "lat", "project_y"];
const Z_ALIASES: &[&str] = &["z", "altura", "elevation", "altitud", "height", "project_z", "cota"];
const TYPE_ALIASES: &[&str] = &["tipo", "type", "object_type", "categoria"];

/// Which representation the imported x/y columns hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateKind {
    Local,
    Utm,
    Geo,
}

impl CoordinateKind {
    pub fn source(&self) -> CoordinateSource {
        match self {
            CoordinateKind::Local => CoordinateSource::Local,
            CoordinateKind::Utm => CoordinateSource::Utm,
            CoordinateKind::Geo => CoordinateSource::Geo,
        }
    }
}

impl fmt::Display for CoordinateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source().as_str())
    }
}

impl FromStr for CoordinateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(CoordinateKind::Local),
            "utm" => Ok(CoordinateKind::Utm),
            "geo" => Ok(CoordinateKind::Geo),
            other => Err(Error::InvalidRecord(format!("Unknown coordinate type: {}", other))),
        }
    }
}

/// One parsed data row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRow {
    /// Spreadsheet-style row number (header is row 1)
    pub row: usize,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub object_type: Option<String>,
}

impl ImportRow {
    /// Builds a record holding this row's coordinates as `kind`
    ///
    /// The x column holds easting/longitude and y northing/latitude, matching
    /// the header aliases.
    pub fn to_record(&self, kind: CoordinateKind) -> CoordinateRecord {
        let mut record = CoordinateRecord {
            project_z: Some(self.z),
            coordinate_source: kind.source(),
            ..Default::default()
        };

        match kind {
            CoordinateKind::Local => {
                record.project_x = Some(self.x);
                record.project_y = Some(self.y);
            }
            CoordinateKind::Utm => {
                record.utm_easting = Some(self.x);
                record.utm_northing = Some(self.y);
            }
            CoordinateKind::Geo => {
                record.geo_latitude = Some(self.y);
                record.geo_longitude = Some(self.x);
            }
        }

        record.extra.insert("name".to_string(), Value::from(self.name.clone()));
        if let Some(object_type) = &self.object_type {
            record.extra.insert("object_type".to_string(), Value::from(object_type.clone()));
        }
        record
    }
}

/// Parsed rows plus per-row problems
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportResult {
    pub rows: Vec<ImportRow>,
    pub errors: Vec<String>,
}

impl ImportResult {
    pub fn to_records(&self, kind: CoordinateKind) -> Vec<CoordinateRecord> {
        self.rows.iter().map(|row| row.to_record(kind)).collect()
    }
}

/// Picks the delimiter from the header line
pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    if header.contains(';') {
        b';'
    } else if header.contains(',') {
        b','
    } else {
        b'\t'
    }
}

struct Columns {
    name: usize,
    x: usize,
    y: usize,
    z: Option<usize>,
    object_type: Option<usize>,
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| aliases.contains(&h.as_str()))
}

fn resolve_columns(headers: &[String]) -> Result<Columns> {
    let name = find_column(headers, NAME_ALIASES).ok_or_else(|| {
        Error::InvalidRecord(format!("no image name column; available columns: {:?}", headers))
    })?;
    let (x, y) = match (find_column(headers, X_ALIASES), find_column(headers, Y_ALIASES)) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(Error::InvalidRecord(format!(
                "no X and Y columns; available columns: {:?}",
                headers
            )))
        }
    };

    Ok(Columns {
        name,
        x,
        y,
        z: find_column(headers, Z_ALIASES),
        object_type: find_column(headers, TYPE_ALIASES),
    })
}

fn field<'r>(record: &'r csv::StringRecord, index: usize) -> Option<&'r str> {
    record.get(index).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(record: &csv::StringRecord, index: usize, column: &str) -> Result<f64> {
    let raw = field(record, index).ok_or_else(|| Error::InvalidRecord(format!("missing {}", column)))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| Error::InvalidRecord(format!("{} is not a number: {:?}", column, raw)))?;
    if !value.is_finite() {
        return Err(Error::InvalidRecord(format!("{} is not finite: {:?}", column, raw)));
    }
    Ok(value)
}

fn parse_row(record: &csv::StringRecord, columns: &Columns, row: usize) -> Result<ImportRow> {
    let name = field(record, columns.name)
        .ok_or_else(|| Error::InvalidRecord("missing image name".to_string()))?
        .to_string();
    let x = parse_number(record, columns.x, "x")?;
    let y = parse_number(record, columns.y, "y")?;
    let z = match columns.z {
        Some(i) if field(record, i).is_some() => parse_number(record, i, "z")?,
        _ => 0.0,
    };
    let object_type = columns
        .object_type
        .and_then(|i| field(record, i))
        .map(str::to_string);

    Ok(ImportRow { row, name, x, y, z, object_type })
}

/// Parses delimited coordinate text
///
/// Header problems fail the whole import; bad data rows are reported in
/// `errors` and skipped.
pub fn parse_coordinates(text: &str) -> Result<ImportResult> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = sniff_delimiter(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let columns = resolve_columns(&headers)?;

    let mut result = ImportResult::default();
    for (index, record) in reader.records().enumerate() {
        let row = index + 2;
        match record.map_err(Error::from).and_then(|r| parse_row(&r, &columns, row)) {
            Ok(parsed) => result.rows.push(parsed),
            Err(e) => result.errors.push(format!("row {}: {}", row, e)),
        }
    }

    debug!(
        delimiter = %(delimiter as char).escape_default(),
        rows = result.rows.len(),
        errors = result.errors.len(),
        "parsed coordinate import"
    );
    Ok(result)
}

/// Reads and parses a coordinate file
pub fn parse_coordinates_file<P: AsRef<Path>>(path: P) -> Result<ImportResult> {
    let bytes = fs::read(path.as_ref())?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::InvalidRecord(format!("file is not UTF-8: {}", e)))?;
    parse_coordinates(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("name;x;y\n1;2;3"), b';');
        assert_eq!(sniff_delimiter("name,x,y"), b',');
        assert_eq!(sniff_delimiter("name\tx\ty"), b'\t');
    }

    #[test]
    fn test_semicolon_with_bom_and_aliases() {
        let text = "\u{feff}Nombre_Imagen ; Easting ; Northing ; Cota\nIMG_001.jpg;440100.5;4474200.25;651.2\nIMG_002.jpg;440110;4474210;\n";
        let result = parse_coordinates(text).unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].name, "IMG_001.jpg");
        assert_eq!(result.rows[0].x, 440100.5);
        assert_eq!(result.rows[0].z, 651.2);
        assert_eq!(result.rows[1].z, 0.0);
        assert_eq!(result.rows[1].row, 3);
    }

    #[test]
    fn test_tab_separated_with_type() {
        let text = "name\tx\ty\ttipo\npano_1\t1.5\t-2\tfoto360\n";
        let result = parse_coordinates(text).unwrap();
        assert_eq!(result.rows[0].object_type.as_deref(), Some("foto360"));
    }

    #[test]
    fn test_bad_rows_are_collected() {
        let text = "name,x,y\na,1,2\nb,oops,2\n,3,4\nd,5,6\n";
        let result = parse_coordinates(text).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("row 3:"));
        assert!(result.errors[1].starts_with("row 4:"));
    }

    #[test]
    fn test_missing_columns() {
        assert!(matches!(parse_coordinates("x,y\n1,2\n"), Err(Error::InvalidRecord(_))));
        assert!(matches!(parse_coordinates("name,x,height\na,1,2\n"), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_geo_rows_map_x_to_longitude() {
        let text = "photo,lat,lon\ncam,40.4168,-3.7038\n";
        let result = parse_coordinates(text).unwrap();
        let records = result.to_records(CoordinateKind::Geo);
        assert_eq!(records[0].geo_latitude, Some(40.4168));
        assert_eq!(records[0].geo_longitude, Some(-3.7038));
        assert_eq!(records[0].coordinate_source, CoordinateSource::Geo);
        assert_eq!(records[0].extra.get("name"), Some(&Value::from("cam")));
    }

    #[test]
    fn test_local_record() {
        let row = ImportRow {
            row: 2,
            name: "p".to_string(),
            x: 1.0,
            y: 2.0,
            z: 3.0,
            object_type: None,
        };
        let record = row.to_record(CoordinateKind::Local);
        assert_eq!(record.project_x, Some(1.0));
        assert_eq!(record.project_z, Some(3.0));
        assert_eq!(record.coordinate_source, CoordinateSource::Local);
        assert!(record.extra.get("object_type").is_none());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("UTM".parse::<CoordinateKind>().unwrap(), CoordinateKind::Utm);
        assert!("manual".parse::<CoordinateKind>().is_err());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name;x;y\nA;1,5;2\n").unwrap();
        let result = parse_coordinates_file(file.path()).unwrap();
        assert_eq!(result.rows.len(), 0);
        assert_eq!(result.errors.len(), 1);
    }
}
