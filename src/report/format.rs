//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the indicator/statistics code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{LeadLagSummary, RunConfig};
use crate::io::RegionSummaryRow;

/// Format the full run summary (inputs, parameters, triggers, statistics).
pub fn format_run_summary(config: &RunConfig, run: &RunOutput) -> String {
    let mut out = String::new();
    let p = &config.params;

    out.push_str("=== sahm - Recession Signal ===\n");
    out.push_str(&format!(
        "Base: {} | Relative: {} | Recession: {}\n",
        config.base_id, config.relative_id, config.recession_id
    ));
    out.push_str(&format!("Range: {} .. {}\n", run.range.start, run.range.end));
    out.push_str(&format!(
        "Params: k={} m={} time_period={} alpha={:.2} field={}\n",
        p.k,
        p.m,
        p.time_period,
        p.alpha_threshold,
        p.field.label()
    ));

    let total = run.indicator.records.len();
    let defined = run.indicator.defined().count();
    let diag = &run.indicator.diagnostics;
    out.push_str(&format!(
        "Records: {total} | defined={defined} | warm-up={} | missing={}\n",
        diag.insufficient_history, diag.missing_samples
    ));

    match run.indicator.last_defined() {
        Some(last) => out.push_str(&format!(
            "Latest: {} indicator={} triggered={}\n",
            last.date,
            fmt_opt(last.value, 3),
            if last.binary == Some(true) { "yes" } else { "no" }
        )),
        None => out.push_str("Latest: n/a\n"),
    }

    out.push_str("\nRecession periods:\n");
    if run.stats.recession_periods.is_empty() {
        out.push_str("  (none)\n");
    }
    for period in &run.stats.recession_periods {
        out.push_str(&format!("  {} .. {}\n", period.start, period.end));
    }

    out.push_str("\nTriggers:\n");
    if run.stats.triggers.is_empty() {
        out.push_str("  (none)\n");
    }
    for date in &run.stats.triggers {
        out.push_str(&format!("  {date}\n"));
    }

    out.push_str("\nStatistics:\n");
    out.push_str(&format!(
        "  accuracy (±{}d): {}\n",
        config.windows.accuracy_time_range,
        fmt_percent(run.stats.accuracy)
    ));
    out.push_str(&format!(
        "  vs recession starts: {}\n",
        fmt_lead_lag(&run.stats.recession_lead_lag)
    ));
    out.push_str(&format!(
        "  vs committee dates (±{}d): {}\n",
        config.windows.committee_time_range,
        fmt_lead_lag(&run.stats.committee_lead_lag)
    ));

    out
}

/// Format the per-region summary table of a batch run.
pub fn format_region_table(rows: &[RegionSummaryRow]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:<14} {:>9} {:>10} {:>10} {:>8}",
            "region", "series", "accuracy", "rec_lead", "cmt_lead", "last"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<28} {:-<14} {:-<9} {:-<10} {:-<10} {:-<8}",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<28} {:<14} {:>9} {:>10} {:>10} {:>8}",
                truncate(&r.region, 28),
                truncate(&r.series_id, 14),
                fmt_percent(r.accuracy),
                fmt_opt(r.recession_lead_time, 0),
                fmt_opt(r.committee_lead_time, 0),
                fmt_opt(r.last_indicator_value, 2),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_lead_lag(s: &LeadLagSummary) -> String {
    format!(
        "leading={}d lagging={}d overall={}d",
        fmt_opt(s.average_days_leading, 0),
        fmt_opt(s.average_days_lagging, 0),
        fmt_opt(s.overall_average_days, 0)
    )
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn fmt_percent(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{}%", v.round()),
        None => "n/a".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_statistics_print_as_na() {
        assert_eq!(fmt_opt(None, 2), "n/a");
        assert_eq!(fmt_opt(Some(-12.345), 1), "-12.3");
        assert_eq!(fmt_percent(Some(66.6)), "67%");
        assert_eq!(fmt_percent(None), "n/a");
    }

    #[test]
    fn region_table_truncates_long_names() {
        let rows = vec![RegionSummaryRow {
            region: "A very long county name that overflows".to_string(),
            series_id: "XX".to_string(),
            accuracy: None,
            recession_lead_time: Some(30.0),
            committee_lead_time: None,
            last_indicator_value: Some(0.5),
        }];
        let table = format_region_table(&rows);
        let line = table.lines().nth(2).unwrap();
        assert!(line.starts_with("A very long county name tha."));
        assert!(line.contains("n/a"));
        assert!(line.ends_with("0.50"));
    }
}
