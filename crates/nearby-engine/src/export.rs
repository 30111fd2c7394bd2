//! Tabular export of the ranked result set.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::ExportError;
use crate::types::{RankedFacility, RankingMode, RoadDistance};

const NAME_HEADER: &str = "Name";
const STRAIGHT_LINE_HEADER: &str = "Straight-Line Miles";
const ROAD_HEADER: &str = "Driving Miles";

/// Writes `rows` as CSV.
///
/// The driving-distance column is present only in [`RankingMode::Road`]; an
/// unavailable route leaves its cell empty. Display attributes follow, in the
/// order their columns first appear.
///
/// # Errors
///
/// Returns [`ExportError`] if writing to `writer` fails.
pub fn write_csv<W: Write>(
    rows: &[RankedFacility],
    mode: RankingMode,
    writer: W,
) -> Result<(), ExportError> {
    let mut attribute_columns: Vec<&str> = Vec::new();
    for row in rows {
        for (column, _) in &row.facility.attributes {
            if !attribute_columns.contains(&column.as_str()) {
                attribute_columns.push(column);
            }
        }
    }

    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec![NAME_HEADER, STRAIGHT_LINE_HEADER];
    if mode == RankingMode::Road {
        header.push(ROAD_HEADER);
    }
    header.extend(attribute_columns.iter().copied());
    out.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.id().to_string(),
            format!("{:.2}", row.straight_line_miles),
        ];
        if mode == RankingMode::Road {
            record.push(
                row.road
                    .and_then(RoadDistance::miles)
                    .map(|miles| format!("{miles:.2}"))
                    .unwrap_or_default(),
            );
        }
        record.extend(
            attribute_columns
                .iter()
                .map(|column| row.facility.attribute(column).unwrap_or_default().to_string()),
        );
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// `<reference-slug>_<radius>mi_<date>.csv`, e.g. `st-mark_3.5mi_2026-10-16.csv`.
#[must_use]
pub fn export_file_name(reference: &str, radius_miles: f64, date: NaiveDate) -> String {
    let slug = reference
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("{slug}_{radius_miles}mi_{}.csv", date.format("%Y-%m-%d"))
}
