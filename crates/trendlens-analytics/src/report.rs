// ABOUTME: Serde-serializable report types returned by the analytics operations.
// ABOUTME: These are the typed success payloads behind the JSON string boundary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trendlens_core::stats;

/// Five-number summary plus the OLS trend slope for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub trend: f64,
}

impl ColumnStats {
    /// Compute stats over a null-aware column. None when no values are
    /// present at all.
    pub fn compute(values: &[Option<f64>]) -> Option<Self> {
        let dense = stats::present(values);
        if dense.is_empty() {
            return None;
        }
        Some(Self {
            mean: stats::mean(&dense),
            median: stats::median(&dense),
            std: stats::std_dev(&dense),
            min: stats::min(&dense),
            max: stats::max(&dense),
            trend: stats::trend(values),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// One strong correlation between two numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub metric_a: String,
    pub metric_b: String,
    pub correlation: f64,
}

/// Output of the descriptive analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    pub metrics: BTreeMap<String, ColumnStats>,
    pub insights: Vec<String>,
    pub correlations: Vec<CorrelationPair>,
}

/// One projected point on the forecast horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub forecast: f64,
}

/// Fit quality and projections for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    pub mse: f64,
    pub r2: f64,
    pub accuracy: f64,
    pub forecasts: Vec<ForecastPoint>,
}

/// Output of the forecaster: both models plus the best-by-R² selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub forecast_results: BTreeMap<String, ModelReport>,
    pub best_model: String,
    pub model_performance: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

/// The comparison outcome for one metric of an A/B test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricComparison {
    pub group_a: GroupStats,
    pub group_b: GroupStats,
    pub improvement: f64,
    pub effect_size: f64,
    pub t_statistic: f64,
    pub significant: bool,
    pub recommendation: String,
}

/// Output of the A/B significance checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbTestReport {
    pub ab_test_results: BTreeMap<String, MetricComparison>,
    pub summary: String,
    pub significant_findings: usize,
}

/// A chart-ready payload for the dashboard, tagged by chart type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Chart {
    Line { data: LineData, title: String },
    Histogram { data: HistogramData, title: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineData {
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramData {
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub record_count: usize,
    pub numeric_columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    pub metrics: BTreeMap<String, ColumnStats>,
}

/// The most recent row's numeric values for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestSnapshot {
    pub latest_timestamp: NaiveDate,
    pub latest_values: BTreeMap<String, f64>,
}

/// Output of the dashboard payload builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub charts: BTreeMap<String, Chart>,
    pub summary: BTreeMap<String, SourceSummary>,
    pub real_time_metrics: BTreeMap<String, LatestSnapshot>,
}
