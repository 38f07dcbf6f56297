// ABOUTME: Two-model forecaster: calendar + lag features, deterministic train/test
// ABOUTME: split, OLS and random-forest fits, and recursive horizon projection.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::Value;
use tracing::{debug, info};
use trendlens_core::{AnalyticsError, Frame};

use crate::forest::RandomForest;
use crate::regression::{LinearModel, mean_squared_error, r2_score};
use crate::report::{ForecastPoint, ForecastReport, ModelReport};

/// Default forecast horizon in periods (days).
pub const DEFAULT_PERIODS: usize = 30;
/// Minimum usable rows after the lag drop.
const MIN_ROWS: usize = 10;
/// Fraction of rows held out for scoring.
const TEST_FRACTION: f64 = 0.2;
/// Seed for the train/test shuffle and the forest's bootstrap draws.
const SEED: u64 = 42;
/// Trees in the random forest.
const FOREST_TREES: usize = 100;
/// The longer of the two lag features; rows without it are dropped.
const MAX_LAG: usize = 7;

const LINEAR_MODEL: &str = "linear_regression";
const FOREST_MODEL: &str = "random_forest";

/// Forecast a date + value series `periods` days past its last observation.
///
/// The series is sorted by date; each row gains five calendar features and
/// the values at t-1 and t-7. Both models are fit on the same deterministic
/// 80/20 split and scored on the held-out portion; the horizon is projected
/// per model with predicted values rolling forward into the lag features.
pub fn generate_forecast(
    records: &Value,
    periods: usize,
) -> Result<ForecastReport, AnalyticsError> {
    let frame = Frame::from_records(records)?;
    let (dates, values) = match (frame.dates("date"), frame.numeric("value")) {
        (Some(dates), Some(values)) => (dates, values),
        _ => {
            return Err(AnalyticsError::MissingColumns(
                "Data must contain 'date' and 'value' columns".to_string(),
            ));
        }
    };

    let mut series: Vec<(NaiveDate, f64)> = dates
        .iter()
        .zip(values)
        .filter_map(|(d, v)| Some(((*d)?, (*v)?)))
        .collect();
    series.sort_by_key(|(date, _)| *date);

    if series.len() <= MAX_LAG || series.len() - MAX_LAG < MIN_ROWS {
        return Err(AnalyticsError::InsufficientData);
    }

    // Feature rows start at index MAX_LAG so both lags are observed.
    let features: Vec<Vec<f64>> = (MAX_LAG..series.len())
        .map(|t| feature_row(series[t].0, series[t - 1].1, series[t - MAX_LAG].1))
        .collect();
    let targets: Vec<f64> = series[MAX_LAG..].iter().map(|(_, v)| *v).collect();

    let (train_idx, test_idx) = split_indices(features.len());
    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| features[i].clone()).collect();
    let y_train: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();
    let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| features[i].clone()).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();

    debug!(
        usable_rows = features.len(),
        train = x_train.len(),
        test = x_test.len(),
        "prepared forecast features"
    );

    let linear = LinearModel::fit(&x_train, &y_train)?;
    let forest = RandomForest::fit(&x_train, &y_train, FOREST_TREES, SEED)?;

    let mut forecast_results = BTreeMap::new();
    forecast_results.insert(
        LINEAR_MODEL.to_string(),
        score_and_project(|row| linear.predict(row), &x_test, &y_test, &series, periods),
    );
    forecast_results.insert(
        FOREST_MODEL.to_string(),
        score_and_project(|row| forest.predict(row), &x_test, &y_test, &series, periods),
    );

    // Best model by held-out R²; ties keep the first in map order.
    let best_model = forecast_results
        .iter()
        .fold(None::<(&String, f64)>, |best, (name, report)| match best {
            Some((_, best_r2)) if report.r2 <= best_r2 => best,
            _ => Some((name, report.r2)),
        })
        .map(|(name, _)| name.clone())
        .ok_or_else(|| AnalyticsError::Computation("no models were fit".to_string()))?;
    let model_performance = forecast_results[&best_model].accuracy;

    info!(best = %best_model, accuracy = model_performance, "forecast complete");

    Ok(ForecastReport {
        summary: format!(
            "Generated {}-period forecast using {} with {:.1}% accuracy",
            periods, best_model, model_performance
        ),
        best_model,
        model_performance,
        forecast_results,
    })
}

/// Calendar and lag features for one row, in fixed order: day-of-week
/// (Monday = 0), day-of-month, month, quarter, year, lag-1, lag-7.
fn feature_row(date: NaiveDate, lag_1: f64, lag_7: f64) -> Vec<f64> {
    vec![
        date.weekday().num_days_from_monday() as f64,
        date.day() as f64,
        date.month() as f64,
        (date.month0() / 3 + 1) as f64,
        date.year() as f64,
        lag_1,
        lag_7,
    ]
}

/// Deterministic shuffled 80/20 split over row indices. The test portion
/// is at least one row.
fn split_indices(n: usize) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(SEED);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * TEST_FRACTION).ceil() as usize).max(1);
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

/// Score one model on the held-out rows and project the horizon. Each
/// predicted value is appended to the rolling history so later steps see it
/// through the lag features.
fn score_and_project<F: Fn(&[f64]) -> f64>(
    predict: F,
    x_test: &[Vec<f64>],
    y_test: &[f64],
    series: &[(NaiveDate, f64)],
    periods: usize,
) -> ModelReport {
    let predictions: Vec<f64> = x_test.iter().map(|row| predict(row)).collect();
    let mse = mean_squared_error(y_test, &predictions);
    let r2 = r2_score(y_test, &predictions);

    let last_date = series[series.len() - 1].0;
    let mut history: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let mut forecasts = Vec::with_capacity(periods);

    for step in 1..=periods {
        let date = last_date + Days::new(step as u64);
        let lag_1 = history[history.len() - 1];
        let lag_7 = history[history.len() - MAX_LAG];
        let value = predict(&feature_row(date, lag_1, lag_7));
        forecasts.push(ForecastPoint {
            date,
            forecast: value,
        });
        history.push(value);
    }

    ModelReport {
        mse,
        r2,
        accuracy: r2 * 100.0,
        forecasts,
    }
}
