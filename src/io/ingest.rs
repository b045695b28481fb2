//! CSV ingest for series files and region lists.
//!
//! Series files carry `date,value[,deseasonalized_value]`; region lists carry a
//! region name and a FRED series id. Headers are matched case-insensitively and
//! a UTF-8 BOM on the first header is ignored.
//!
//! Design goals:
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Missing stays missing**: empty or `.` values become missing samples
//! - **Separation of concerns**: no indicator logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Observation, ObservationSeries, Sample, Series};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the series plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub series: ObservationSeries,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// One region of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub series_id: String,
}

/// Read a `date,value[,deseasonalized_value]` CSV.
///
/// Rows are sorted by date; a repeated date is an error for the whole file.
pub fn read_observations<R: Read>(reader: R) -> Result<IngestedSeries, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["date", "value"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(2, format!("Missing required column: `{required}`")));
        }
    }

    let mut samples = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header line plus 1-based numbering.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_observation(&record, &header_map));
        match parsed {
            Ok(sample) => samples.push(sample),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(IngestedSeries {
        series: Series::from_unsorted(samples)?,
        row_errors,
        rows_read,
    })
}

pub fn load_observations(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_observations(file)
}

/// Read a region list. Rows without a series id are skipped.
pub fn read_regions<R: Read>(reader: R) -> Result<Vec<Region>, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let id_column = ["seriesid", "series_id"]
        .into_iter()
        .find(|c| header_map.contains_key(*c))
        .ok_or_else(|| AppError::new(2, "Missing required column: `SeriesId` (or `series_id`)"))?;
    let name_column = ["county", "region", "name"]
        .into_iter()
        .find(|c| header_map.contains_key(*c));

    let mut regions = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("region list line {}: CSV parse error: {e}", idx + 2);
                continue;
            }
        };
        let Some(series_id) = get_optional(&record, &header_map, id_column) else {
            continue;
        };
        let name = name_column
            .and_then(|c| get_optional(&record, &header_map, c))
            .unwrap_or(series_id);
        regions.push(Region {
            name: name.to_string(),
            series_id: series_id.to_string(),
        });
    }

    if regions.is_empty() {
        return Err(AppError::new(3, "Region list has no rows with a series id."));
    }
    Ok(regions)
}

pub fn load_regions(path: &Path) -> Result<Vec<Region>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open region list '{}': {e}", path.display())))?;
    read_regions(file)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn parse_observation(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<Sample<Observation>, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;
    let value = parse_opt_value(get_optional(record, header_map, "value"))?;
    let deseasonalized_value = parse_opt_value(get_optional(record, header_map, "deseasonalized_value"))?;
    Ok(Sample::new(
        date,
        Observation {
            value,
            deseasonalized_value,
        },
    ))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are expected; a date-time suffix (as written by some exporters) is tolerated.
    let day = s.split(['T', ' ']).next().unwrap_or(s);
    const FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(day, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

/// Empty and `.` are missing; anything else must be a finite number.
fn parse_opt_value(s: Option<&str>) -> Result<Option<f64>, String> {
    let Some(s) = s else { return Ok(None) };
    if s == "." {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(format!("Invalid numeric value '{s}'.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_keep_missing_values_and_sort() {
        let csv = "\u{feff}Date,Value,Deseasonalized_Value\n\
                   2020-02-01,3.5,3.6\n\
                   2020-01-01,.,\n\
                   2020-03-01T00:00:00.000Z,4.4,\n";
        let ingested = read_observations(csv.as_bytes()).unwrap();
        assert!(ingested.row_errors.is_empty());
        assert_eq!(ingested.rows_read, 3);

        let s = ingested.series.samples();
        assert_eq!(s[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(s[0].value.value, None);
        assert_eq!(s[1].value.deseasonalized_value, Some(3.6));
        assert_eq!(s[2].value.value, Some(4.4));
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let csv = "date,value\n2020-01-01,abc\nnot-a-date,1.0\n2020-02-01,2.0\n";
        let ingested = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(ingested.series.len(), 1);
        let lines: Vec<_> = ingested.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn duplicate_dates_fail_the_file() {
        let csv = "date,value\n2020-01-01,1\n2020-01-01,2\n";
        let err = read_observations(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn regions_skip_rows_without_series_id() {
        let csv = "County,SeriesId\nCook County,ILCOOK1URN\nNowhere,\nLake County,ILLAKE7URN\n";
        let regions = read_regions(csv.as_bytes()).unwrap();
        assert_eq!(
            regions,
            vec![
                Region {
                    name: "Cook County".to_string(),
                    series_id: "ILCOOK1URN".to_string()
                },
                Region {
                    name: "Lake County".to_string(),
                    series_id: "ILLAKE7URN".to_string()
                },
            ]
        );
    }
}
