// ABOUTME: Dashboard payload builder: chart-ready series, per-source summaries,
// ABOUTME: and a latest-row snapshot for each named data source.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;
use trendlens_core::{AnalyticsError, Frame};

use crate::report::{
    Chart, ColumnStats, DashboardReport, DateRange, HistogramData, LatestSnapshot, LineData,
    SourceSummary,
};

/// Numeric column names that qualify as the time-series value, in
/// preference order.
const VALUE_COLUMNS: [&str; 3] = ["value", "amount", "count"];
/// At most this many histogram charts per source.
const MAX_HISTOGRAMS: usize = 3;

/// Build chart payloads, summaries, and latest-row snapshots for a mapping
/// of source name to record array.
pub fn build_dashboard(sources: &Value) -> Result<DashboardReport, AnalyticsError> {
    let map = sources.as_object().ok_or_else(|| {
        AnalyticsError::MalformedInput(
            "expected a JSON object mapping source names to record arrays".to_string(),
        )
    })?;

    let mut charts = BTreeMap::new();
    let mut summary = BTreeMap::new();
    let mut real_time_metrics = BTreeMap::new();

    for (source_name, records) in map {
        let frame = Frame::from_records(records)?;
        debug!(source = %source_name, rows = frame.len(), "building dashboard source");

        if let Some(chart) = time_series_chart(&frame, source_name) {
            charts.insert(format!("{}_timeseries", source_name), chart);
        }

        for (column, values) in frame.numeric_columns().take(MAX_HISTOGRAMS) {
            charts.insert(
                format!("{}_{}_distribution", source_name, column),
                Chart::Histogram {
                    data: HistogramData {
                        values: values.iter().flatten().copied().collect(),
                    },
                    title: format!("Distribution of {} in {}", column, source_name),
                },
            );
        }

        summary.insert(source_name.clone(), source_summary(&frame));

        if let Some(snapshot) = latest_snapshot(&frame) {
            real_time_metrics.insert(source_name.clone(), snapshot);
        }
    }

    Ok(DashboardReport {
        charts,
        summary,
        real_time_metrics,
    })
}

/// A line chart over the "date" column and the first qualifying numeric
/// value column, keeping only rows where both are present.
fn time_series_chart(frame: &Frame, source_name: &str) -> Option<Chart> {
    let dates = frame.dates("date")?;
    let values = VALUE_COLUMNS.iter().find_map(|name| frame.numeric(name))?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (date, value) in dates.iter().zip(values) {
        if let (Some(date), Some(value)) = (date, value) {
            x.push(*date);
            y.push(*value);
        }
    }

    Some(Chart::Line {
        data: LineData { x, y },
        title: format!("{} Over Time", source_name),
    })
}

fn source_summary(frame: &Frame) -> SourceSummary {
    let mut metrics = BTreeMap::new();
    for (column, values) in frame.numeric_columns() {
        if let Some(stats) = ColumnStats::compute(values) {
            metrics.insert(column.to_string(), stats);
        }
    }

    let date_range = frame.dates("date").and_then(|dates| {
        let present: Vec<_> = dates.iter().flatten().copied().collect();
        Some(DateRange {
            start: *present.iter().min()?,
            end: *present.iter().max()?,
        })
    });

    SourceSummary {
        record_count: frame.len(),
        numeric_columns: frame.numeric_columns().count(),
        date_range,
        metrics,
    }
}

/// The numeric values of the row holding the maximum date. The first
/// occurrence wins when the maximum date repeats.
fn latest_snapshot(frame: &Frame) -> Option<LatestSnapshot> {
    let dates = frame.dates("date")?;
    let (row, latest) = dates
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.map(|date| (i, date)))
        .fold(None::<(usize, chrono::NaiveDate)>, |best, (i, date)| {
            match best {
                Some((_, best_date)) if date <= best_date => best,
                _ => Some((i, date)),
            }
        })?;

    let latest_values = frame
        .numeric_columns()
        .filter_map(|(name, values)| values[row].map(|v| (name.to_string(), v)))
        .collect();

    Some(LatestSnapshot {
        latest_timestamp: latest,
        latest_values,
    })
}
