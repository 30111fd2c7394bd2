//! CSV loading for facility and reference-point tables.
//!
//! Each table has an identity column (name configurable), `Latitude` and
//! `Longitude` columns matched case-insensitively, and any number of display
//! columns kept verbatim. Rows with unusable coordinates are dropped with a
//! warning; a repeated identity fails the whole load, since selection and
//! road distances are both keyed by it.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::types::{Attributes, Facility, FacilityId, Point, ReferencePoint};
use crate::{ConfigError, InputError};

const LATITUDE_COLUMN: &str = "latitude";
const LONGITUDE_COLUMN: &str = "longitude";

struct Row {
    id: String,
    point: Point,
    attributes: Attributes,
}

struct Columns {
    id: usize,
    lat: usize,
    lon: usize,
}

/// Load the facility table from a CSV file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be opened or parsed, a required
/// column is missing, or an identity appears twice.
pub fn load_facilities(path: &Path, id_column: &str) -> Result<Vec<Facility>, ConfigError> {
    let file = open(path)?;
    facilities_from_reader(file, &path.display().to_string(), id_column)
}

/// Parse a facility table from any reader. `source` names the input in errors.
///
/// # Errors
///
/// Same as [`load_facilities`], minus the I/O open failure.
pub fn facilities_from_reader<R: Read>(
    reader: R,
    source: &str,
    id_column: &str,
) -> Result<Vec<Facility>, ConfigError> {
    let rows = read_rows(reader, source, id_column)?;
    Ok(rows
        .into_iter()
        .map(|row| Facility {
            id: FacilityId::new(row.id),
            point: row.point,
            attributes: row.attributes,
        })
        .collect())
}

/// Load the reference-point table from a CSV file.
///
/// # Errors
///
/// Returns `ConfigError` under the same conditions as [`load_facilities`].
pub fn load_references(path: &Path, id_column: &str) -> Result<ReferenceSet, ConfigError> {
    let file = open(path)?;
    references_from_reader(file, &path.display().to_string(), id_column)
}

/// Parse a reference-point table from any reader.
///
/// # Errors
///
/// Same as [`load_references`], minus the I/O open failure.
pub fn references_from_reader<R: Read>(
    reader: R,
    source: &str,
    id_column: &str,
) -> Result<ReferenceSet, ConfigError> {
    let rows = read_rows(reader, source, id_column)?;
    Ok(ReferenceSet::new(
        rows.into_iter()
            .map(|row| ReferencePoint {
                name: row.id,
                point: row.point,
                attributes: row.attributes,
            })
            .collect(),
    ))
}

fn open(path: &Path) -> Result<File, ConfigError> {
    File::open(path).map_err(|e| ConfigError::DataFileIo {
        path: path.display().to_string(),
        source: e,
    })
}

fn read_rows<R: Read>(reader: R, source: &str, id_column: &str) -> Result<Vec<Row>, ConfigError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let parse_err = |e: csv::Error| ConfigError::DataFileParse {
        path: source.to_string(),
        source: e,
    };

    let headers = reader.headers().map_err(parse_err)?.clone();
    let columns = locate_columns(&headers, source, id_column)?;

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(parse_err)?;
        let line = index + 2;

        let id = record.get(columns.id).unwrap_or_default().to_string();
        if id.is_empty() {
            tracing::warn!(source, line, "dropping row with empty identity");
            dropped += 1;
            continue;
        }

        let Some(point) = parse_point(&record, &columns) else {
            tracing::warn!(source, line, identity = %id, "dropping row with missing or invalid coordinates");
            dropped += 1;
            continue;
        };

        if !seen.insert(id.clone()) {
            return Err(ConfigError::DuplicateIdentity {
                path: source.to_string(),
                identity: id,
            });
        }

        let attributes = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(i, _)| ![columns.id, columns.lat, columns.lon].contains(i))
            .map(|(_, (k, v))| (k.to_string(), v.to_string()))
            .collect();

        rows.push(Row {
            id,
            point,
            attributes,
        });
    }

    tracing::debug!(source, loaded = rows.len(), dropped, "dataset loaded");
    Ok(rows)
}

fn locate_columns(
    headers: &csv::StringRecord,
    source: &str,
    id_column: &str,
) -> Result<Columns, ConfigError> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::MissingColumn {
                path: source.to_string(),
                column: name.to_string(),
            })
    };
    Ok(Columns {
        id: find(id_column)?,
        lat: find(LATITUDE_COLUMN)?,
        lon: find(LONGITUDE_COLUMN)?,
    })
}

fn parse_point(record: &csv::StringRecord, columns: &Columns) -> Option<Point> {
    let lat = record.get(columns.lat)?.parse::<f64>().ok()?;
    let lon = record.get(columns.lon)?.parse::<f64>().ok()?;
    Point::new(lat, lon).ok()
}

/// The externally supplied set of reference points, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    points: Vec<ReferencePoint>,
}

impl ReferenceSet {
    #[must_use]
    pub fn new(points: Vec<ReferencePoint>) -> Self {
        Self { points }
    }

    /// # Errors
    ///
    /// Returns [`InputError::UnknownReference`] if no reference point has this name.
    pub fn get(&self, name: &str) -> Result<&ReferencePoint, InputError> {
        self.points
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| InputError::UnknownReference(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferencePoint> {
        self.points.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHOOLS: &str = "\
School,Address,Latitude,Longitude,Phone
Lincoln Elementary,12 Oak St,36.01,-86.0,555-0100
Hillside Middle,4 Elm Ave,36.04,-86.01,555-0101
";

    #[test]
    fn loads_facilities_with_attributes_in_column_order() {
        let facilities = facilities_from_reader(SCHOOLS.as_bytes(), "schools.csv", "School")
            .expect("valid csv");
        assert_eq!(facilities.len(), 2);
        let first = &facilities[0];
        assert_eq!(first.id.as_str(), "Lincoln Elementary");
        assert!((first.point.lat() - 36.01).abs() < f64::EPSILON);
        assert_eq!(
            first.attributes,
            vec![
                ("Address".to_string(), "12 Oak St".to_string()),
                ("Phone".to_string(), "555-0100".to_string()),
            ]
        );
    }

    #[test]
    fn coordinate_headers_match_case_insensitively() {
        let csv = "name,LATITUDE,longitude\nA,1.0,2.0\n";
        let facilities = facilities_from_reader(csv.as_bytes(), "t", "Name").unwrap();
        assert_eq!(facilities.len(), 1);
    }

    #[test]
    fn drops_rows_with_missing_or_invalid_coordinates() {
        let csv = "\
Name,Latitude,Longitude
Good,36.0,-86.0
Blank,,-86.0
Text,abc,-86.0
Range,91.0,-86.0
";
        let facilities = facilities_from_reader(csv.as_bytes(), "t", "Name").unwrap();
        let names: Vec<&str> = facilities.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(names, vec!["Good"]);
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let csv = "Name,Latitude,Longitude\nA,1,1\nA,2,2\n";
        let err = facilities_from_reader(csv.as_bytes(), "t", "Name").unwrap_err();
        assert!(
            matches!(err, ConfigError::DuplicateIdentity { ref identity, .. } if identity == "A"),
            "got: {err:?}"
        );
    }

    #[test]
    fn missing_identity_column_is_reported() {
        let csv = "Title,Latitude,Longitude\nA,1,1\n";
        let err = facilities_from_reader(csv.as_bytes(), "t", "Name").unwrap_err();
        assert!(matches!(err, ConfigError::MissingColumn { ref column, .. } if column == "Name"));
    }

    #[test]
    fn reference_lookup_by_name() {
        let csv = "Church,Latitude,Longitude\nSt. Mark,36.0,-86.0\n";
        let refs = references_from_reader(csv.as_bytes(), "t", "Church").unwrap();
        assert_eq!(refs.len(), 1);
        assert!(refs.get("St. Mark").is_ok());
        assert_eq!(
            refs.get("Grace").unwrap_err(),
            InputError::UnknownReference("Grace".to_string())
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_facilities(Path::new("/nonexistent/facilities.csv"), "Name").unwrap_err();
        assert!(matches!(err, ConfigError::DataFileIo { .. }));
    }
}
