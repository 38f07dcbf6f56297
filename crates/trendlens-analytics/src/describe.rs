// ABOUTME: Descriptive analyzer: per-column summary statistics, insight strings,
// ABOUTME: and the correlation scanner over all numeric column pairs.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;
use trendlens_core::{AnalyticsError, Frame, stats};

use crate::report::{AnalysisReport, AnalysisSummary, ColumnStats, CorrelationPair, DateRange};

/// Coefficient-of-variation threshold for the high-variability insight.
const HIGH_VARIABILITY_CV: f64 = 0.5;
/// Magnitude the trend slope must exceed to produce a trend insight.
const TREND_THRESHOLD: f64 = 0.1;
/// Magnitude a Pearson coefficient must exceed to count as strong.
const STRONG_CORRELATION: f64 = 0.7;

/// Analyze a record set: record count, date range, per-numeric-column
/// statistics, insight strings, and strong correlation pairs.
///
/// Empty input is not an error; it yields zero records and empty sections.
pub fn analyze_metrics(records: &Value) -> Result<AnalysisReport, AnalyticsError> {
    let frame = Frame::from_records(records)?;

    let date_range = frame.first_date_column().and_then(|(_, dates)| {
        let present: Vec<_> = dates.iter().flatten().copied().collect();
        Some(DateRange {
            start: *present.iter().min()?,
            end: *present.iter().max()?,
        })
    });

    let mut metrics = BTreeMap::new();
    let mut insights = Vec::new();

    for (name, values) in frame.numeric_columns() {
        let Some(column_stats) = ColumnStats::compute(values) else {
            continue;
        };

        if column_stats.mean != 0.0 {
            let cv = column_stats.std / column_stats.mean;
            if cv > HIGH_VARIABILITY_CV {
                insights.push(format!("High variability in {} (CV: {:.2})", name, cv));
            }
        }

        if column_stats.trend > TREND_THRESHOLD {
            insights.push(format!("Positive trend detected in {}", name));
        } else if column_stats.trend < -TREND_THRESHOLD {
            insights.push(format!("Negative trend detected in {}", name));
        }

        debug!(column = name, mean = column_stats.mean, trend = column_stats.trend, "analyzed column");
        metrics.insert(name.to_string(), column_stats);
    }

    let correlations = scan_correlations(&frame);
    if !correlations.is_empty() {
        insights.push(format!(
            "Found {} strong correlations between metrics",
            correlations.len()
        ));
    }

    Ok(AnalysisReport {
        summary: AnalysisSummary {
            total_records: frame.len(),
            date_range,
        },
        metrics,
        insights,
        correlations,
    })
}

/// Pairwise Pearson correlation across numeric columns, reporting each
/// off-diagonal pair once when its magnitude strictly exceeds the
/// strong-correlation threshold.
pub fn scan_correlations(frame: &Frame) -> Vec<CorrelationPair> {
    let columns: Vec<_> = frame.numeric_columns().collect();
    let mut pairs = Vec::new();

    for i in 0..columns.len() {
        for j in (i + 1)..columns.len() {
            let r = stats::pearson(columns[i].1, columns[j].1);
            if r.abs() > STRONG_CORRELATION {
                pairs.push(CorrelationPair {
                    metric_a: columns[i].0.to_string(),
                    metric_b: columns[j].0.to_string(),
                    correlation: r,
                });
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_record_set_yields_empty_report_not_error() {
        let report = analyze_metrics(&json!([])).unwrap();
        assert_eq!(report.summary.total_records, 0);
        assert!(report.summary.date_range.is_none());
        assert!(report.metrics.is_empty());
        assert!(report.insights.is_empty());
        assert!(report.correlations.is_empty());
    }

    #[test]
    fn computes_stats_and_date_range() {
        let report = analyze_metrics(&json!([
            {"date": "2024-01-01", "clicks": 10},
            {"date": "2024-01-03", "clicks": 20},
            {"date": "2024-01-02", "clicks": 30},
        ]))
        .unwrap();

        assert_eq!(report.summary.total_records, 3);
        let range = report.summary.date_range.unwrap();
        assert_eq!(range.start.to_string(), "2024-01-01");
        assert_eq!(range.end.to_string(), "2024-01-03");

        let clicks = &report.metrics["clicks"];
        assert_eq!(clicks.mean, 20.0);
        assert_eq!(clicks.median, 20.0);
        assert_eq!(clicks.min, 10.0);
        assert_eq!(clicks.max, 30.0);
    }

    #[test]
    fn cv_exactly_at_threshold_is_not_flagged() {
        // {2, 4, 6}: mean 4, sample std 2, CV exactly 0.5.
        let report = analyze_metrics(&json!([
            {"v": 2.0}, {"v": 4.0}, {"v": 6.0},
        ]))
        .unwrap();
        assert!(
            !report.insights.iter().any(|s| s.starts_with("High variability")),
            "CV of exactly 0.5 must not be flagged: {:?}",
            report.insights
        );
    }

    #[test]
    fn cv_just_above_threshold_is_flagged() {
        // Widening the spread slightly pushes CV above 0.5.
        let report = analyze_metrics(&json!([
            {"v": 1.9}, {"v": 4.0}, {"v": 6.1},
        ]))
        .unwrap();
        assert!(
            report.insights.iter().any(|s| s.starts_with("High variability in v")),
            "CV above 0.5 must be flagged: {:?}",
            report.insights
        );
    }

    #[test]
    fn trend_insights_respect_direction_and_magnitude() {
        let rising: Vec<_> = (0..10).map(|i| json!({"up": i, "flat": 5})).collect();
        let report = analyze_metrics(&json!(rising)).unwrap();

        assert!(report.insights.iter().any(|s| s == "Positive trend detected in up"));
        assert!(!report.insights.iter().any(|s| s.contains("trend detected in flat")));
    }

    #[test]
    fn exactly_one_pair_reported_when_only_one_exceeds_threshold() {
        // x and y move together (r near 1); z is unrelated noise.
        let records: Vec<_> = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
            .iter()
            .zip([0.2, 1.1, 1.9, 3.2, 3.8, 5.1, 6.0, 7.1])
            .zip([3.0, -2.0, 5.0, 1.0, -4.0, 2.0, 0.0, -1.0])
            .map(|((x, y), z)| json!({"x": x, "y": y, "z": z}))
            .collect();
        let report = analyze_metrics(&json!(records)).unwrap();

        assert_eq!(report.correlations.len(), 1, "{:?}", report.correlations);
        let pair = &report.correlations[0];
        assert_eq!(pair.metric_a, "x");
        assert_eq!(pair.metric_b, "y");
        assert!(pair.correlation > 0.9);
        assert!(
            report
                .insights
                .iter()
                .any(|s| s == "Found 1 strong correlations between metrics")
        );
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = analyze_metrics(&json!("not records")).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedInput(_)));
    }
}
