// ABOUTME: A/B significance checker: per-metric group statistics, pooled-std
// ABOUTME: approximate t-statistic, effect size, and a plain-text recommendation.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;
use trendlens_core::{AnalyticsError, Frame, stats};

use crate::report::{AbTestReport, GroupStats, MetricComparison};

/// |t| must strictly exceed this to count as significant; a fixed heuristic
/// approximating p < 0.05 for moderate sample sizes.
const T_THRESHOLD: f64 = 2.0;

const GROUP_A: &str = "A";
const GROUP_B: &str = "B";

/// Compare groups A and B per distinct metric. Records need "group",
/// "metric", and "value" columns; metrics where either group has no
/// records are skipped entirely rather than reported as errors.
pub fn analyze_ab_test(records: &Value) -> Result<AbTestReport, AnalyticsError> {
    let frame = Frame::from_records(records)?;
    let (groups, metrics, values) = match (
        frame.text("group"),
        frame.text("metric"),
        frame.numeric("value"),
    ) {
        (Some(g), Some(m), Some(v)) => (g, m, v),
        _ => {
            return Err(AnalyticsError::MissingColumns(
                "Data must contain 'group', 'metric', and 'value' columns".to_string(),
            ));
        }
    };

    // Per metric, the observed values of each group. Rows with a null in
    // any of the three columns contribute nothing.
    let mut by_metric: BTreeMap<String, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for i in 0..frame.len() {
        let (Some(group), Some(metric), Some(value)) = (&groups[i], &metrics[i], values[i]) else {
            continue;
        };
        let entry = by_metric.entry(metric.clone()).or_default();
        match group.as_str() {
            GROUP_A => entry.0.push(value),
            GROUP_B => entry.1.push(value),
            _ => {}
        }
    }

    let mut ab_test_results = BTreeMap::new();
    for (metric, (sample_a, sample_b)) in by_metric {
        if sample_a.is_empty() || sample_b.is_empty() {
            debug!(metric = %metric, "skipping metric with an empty group");
            continue;
        }
        ab_test_results.insert(metric, compare_groups(&sample_a, &sample_b));
    }

    let significant_findings = ab_test_results
        .values()
        .filter(|r| r.significant)
        .count();

    Ok(AbTestReport {
        summary: format!("Analyzed {} metrics", ab_test_results.len()),
        significant_findings,
        ab_test_results,
    })
}

/// The full comparison for one metric's two samples.
fn compare_groups(sample_a: &[f64], sample_b: &[f64]) -> MetricComparison {
    let mean_a = stats::mean(sample_a);
    let mean_b = stats::mean(sample_b);
    let std_a = stats::std_dev(sample_a);
    let std_b = stats::std_dev(sample_b);
    let n_a = sample_a.len();
    let n_b = sample_b.len();

    let improvement = if mean_a != 0.0 {
        (mean_b - mean_a) / mean_a * 100.0
    } else {
        0.0
    };

    let effect_size = if std_a + std_b > 0.0 {
        (mean_b - mean_a) / ((std_a + std_b) / 2.0)
    } else {
        0.0
    };

    // Pooled variance weighted by degrees of freedom, then the two-sample
    // t approximation. Degenerate denominators yield t = 0.
    let df = n_a + n_b;
    let t_statistic = if df > 2 {
        let pooled_variance = ((n_a - 1) as f64 * std_a.powi(2)
            + (n_b - 1) as f64 * std_b.powi(2))
            / (df - 2) as f64;
        if pooled_variance > 0.0 {
            (mean_b - mean_a)
                / (pooled_variance.sqrt() * (1.0 / n_a as f64 + 1.0 / n_b as f64).sqrt())
        } else {
            0.0
        }
    } else {
        0.0
    };

    let significant = t_statistic.abs() > T_THRESHOLD;
    let recommendation = if significant && mean_b > mean_a {
        "Implement Group B".to_string()
    } else {
        "Continue current version".to_string()
    };

    MetricComparison {
        group_a: GroupStats {
            mean: mean_a,
            std: std_a,
            count: n_a,
        },
        group_b: GroupStats {
            mean: mean_b,
            std: std_b,
            count: n_b,
        },
        improvement,
        effect_size,
        t_statistic,
        significant,
        recommendation,
    }
}
