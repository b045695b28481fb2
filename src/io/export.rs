//! Export indicator series and statistics.
//!
//! Undefined values are written as empty fields, never as `0`, so a consumer
//! can tell "no value yet" from a genuine zero.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::TimeSeries;
use crate::error::AppError;
use crate::signal::IndicatorSeries;
use crate::stats::TriggerStats;

#[derive(Debug, Serialize)]
struct SeriesRow<'a> {
    region: &'a str,
    date: NaiveDate,
    unemployment_rate: Option<f64>,
    indicator: Option<f64>,
    binary: Option<u8>,
    recession: Option<u8>,
}

/// One line of the aggregated per-region file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummaryRow {
    pub region: String,
    pub series_id: String,
    pub accuracy: Option<f64>,
    pub recession_lead_time: Option<f64>,
    pub committee_lead_time: Option<f64>,
    pub last_indicator_value: Option<f64>,
}

impl RegionSummaryRow {
    pub fn new(region: &str, series_id: &str, stats: &TriggerStats) -> Self {
        Self {
            region: region.to_string(),
            series_id: series_id.to_string(),
            accuracy: stats.accuracy,
            recession_lead_time: stats.recession_lead_time(),
            committee_lead_time: stats.committee_lead_time(),
            last_indicator_value: stats.last_indicator_value,
        }
    }
}

/// Write `region,date,unemployment_rate,indicator,binary,recession` rows.
pub fn write_indicator_rows<W: Write>(
    writer: W,
    region: &str,
    rates: &TimeSeries,
    indicator: &IndicatorSeries,
) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    for record in &indicator.records {
        out.serialize(SeriesRow {
            region,
            date: record.date,
            unemployment_rate: rates.get(record.date).copied().flatten(),
            indicator: record.value,
            binary: record.binary.map(u8::from),
            recession: record.recession_reference.map(u8::from),
        })
        .map_err(|e| AppError::new(4, format!("Failed to write indicator row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush indicator CSV: {e}")))?;
    Ok(())
}

pub fn write_indicator_csv(
    path: &Path,
    region: &str,
    rates: &TimeSeries,
    indicator: &IndicatorSeries,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_indicator_rows(file, region, rates, indicator)
}

pub fn write_summary_rows<W: Write>(writer: W, rows: &[RegionSummaryRow]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)
            .map_err(|e| AppError::new(4, format!("Failed to write summary row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush summary CSV: {e}")))?;
    Ok(())
}

pub fn write_summary_csv(path: &Path, rows: &[RegionSummaryRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create summary CSV '{}': {e}", path.display())))?;
    write_summary_rows(file, rows)
}

/// Pretty-printed JSON of any serializable run summary.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::new(4, format!("Failed to write JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRecord;
    use crate::signal::WindowDiagnostics;

    #[test]
    fn undefined_values_are_blank() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        let rates = TimeSeries::from_values(vec![(d1, 3.5), (d2, 4.0)]).unwrap();
        let indicator = IndicatorSeries {
            records: vec![
                IndicatorRecord {
                    date: d1,
                    value: None,
                    binary: None,
                    recession_reference: Some(false),
                },
                IndicatorRecord {
                    date: d2,
                    value: Some(0.5),
                    binary: Some(true),
                    recession_reference: None,
                },
            ],
            diagnostics: WindowDiagnostics::default(),
        };

        let mut buf = Vec::new();
        write_indicator_rows(&mut buf, "US", &rates, &indicator).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "region,date,unemployment_rate,indicator,binary,recession");
        assert_eq!(lines[1], "US,2020-01-01,3.5,,,0");
        assert_eq!(lines[2], "US,2020-02-01,4.0,0.5,1,");
    }

    #[test]
    fn summary_rows_have_stable_header() {
        let rows = vec![RegionSummaryRow {
            region: "Cook County".to_string(),
            series_id: "ILCOOK1URN".to_string(),
            accuracy: Some(50.0),
            recession_lead_time: None,
            committee_lead_time: Some(-12.5),
            last_indicator_value: Some(0.25),
        }];
        let mut buf = Vec::new();
        write_summary_rows(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "region,series_id,accuracy,recession_lead_time,committee_lead_time,last_indicator_value\n\
             Cook County,ILCOOK1URN,50.0,,-12.5,0.25\n"
        );
    }
}
