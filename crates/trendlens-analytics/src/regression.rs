// ABOUTME: Ordinary least squares linear regression via normal equations,
// ABOUTME: with a rank-aware solver and the shared MSE / R² scoring helpers.

use trendlens_core::AnalyticsError;

/// A fitted linear model: intercept plus one coefficient per feature.
#[derive(Debug, Clone)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    /// Fit by ordinary least squares. The design matrix is augmented with
    /// an intercept column; the normal equations are solved with partial
    /// pivoting. Linearly dependent columns (a constant calendar feature,
    /// for example) resolve to a zero coefficient instead of failing.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self, AnalyticsError> {
        if x.is_empty() || x.len() != y.len() {
            return Err(AnalyticsError::Computation(
                "regression requires a non-empty feature matrix matching the target length"
                    .to_string(),
            ));
        }
        let n_features = x[0].len();
        if x.iter().any(|row| row.len() != n_features) {
            return Err(AnalyticsError::Computation(
                "regression feature rows have inconsistent widths".to_string(),
            ));
        }

        // Normal equations over the intercept-augmented design: G w = b
        // where G = XᵀX and b = Xᵀy.
        let dim = n_features + 1;
        let mut g = vec![vec![0.0; dim]; dim];
        let mut b = vec![0.0; dim];
        for (row, &target) in x.iter().zip(y) {
            let augmented: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
            for i in 0..dim {
                for j in 0..dim {
                    g[i][j] += augmented[i] * augmented[j];
                }
                b[i] += augmented[i] * target;
            }
        }

        let solution = solve_symmetric(g, b)?;
        Ok(Self {
            intercept: solution[0],
            coefficients: solution[1..].to_vec(),
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, f)| c * f)
                .sum::<f64>()
    }
}

/// Solve a symmetric positive semi-definite system by Gaussian elimination
/// with partial pivoting. A pivot below tolerance marks a linearly
/// dependent column; its unknown is fixed to zero and the system reduced.
fn solve_symmetric(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, AnalyticsError> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    let tolerance = scale * 1e-12 + f64::MIN_POSITIVE;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r, &s| {
                a[r][col]
                    .abs()
                    .partial_cmp(&a[s][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| AnalyticsError::Computation("empty linear system".to_string()))?;

        if a[pivot_row][col].abs() <= tolerance {
            // Dependent column: pin its unknown to zero.
            for row in a.iter_mut() {
                row[col] = 0.0;
            }
            for v in a[col].iter_mut() {
                *v = 0.0;
            }
            a[col][col] = 1.0;
            b[col] = 0.0;
            continue;
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let (pivot_rows, lower_rows) = a.split_at_mut(col + 1);
        let pivot = &pivot_rows[col];
        let pivot_b = b[col];
        for (offset, row) in lower_rows.iter_mut().enumerate() {
            let factor = row[col] / pivot[col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                row[k] -= factor * pivot[k];
            }
            b[col + 1 + offset] -= factor * pivot_b;
        }
    }

    let mut solution = vec![0.0; n];
    for col in (0..n).rev() {
        let mut rhs = b[col];
        for k in (col + 1)..n {
            rhs -= a[col][k] * solution[k];
        }
        if a[col][col] == 0.0 {
            return Err(AnalyticsError::Computation(
                "singular system during back substitution".to_string(),
            ));
        }
        solution[col] = rhs / a[col][col];
    }

    for v in &solution {
        if !v.is_finite() {
            return Err(AnalyticsError::Computation(
                "regression produced non-finite coefficients".to_string(),
            ));
        }
    }
    Ok(solution)
}

/// Mean squared error between observed and predicted values.
pub fn mean_squared_error(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    observed
        .iter()
        .zip(predicted)
        .map(|(o, p)| (o - p).powi(2))
        .sum::<f64>()
        / observed.len() as f64
}

/// Coefficient of determination. Zero when the observed values are
/// constant (no variance to explain).
pub fn r2_score(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_total: f64 = observed.iter().map(|o| (o - mean).powi(2)).sum();
    if ss_total == 0.0 {
        return 0.0;
    }
    let ss_residual: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(o, p)| (o - p).powi(2))
        .sum();
    1.0 - ss_residual / ss_total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_recovers_exact_linear_relation() {
        // y = 3 + 2a - b
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, (i % 5) as f64])
            .collect();
        let y: Vec<f64> = x.iter().map(|row| 3.0 + 2.0 * row[0] - row[1]).collect();

        let model = LinearModel::fit(&x, &y).unwrap();
        for (row, expected) in x.iter().zip(&y) {
            assert!(
                (model.predict(row) - expected).abs() < 1e-6,
                "prediction drifted: {} vs {}",
                model.predict(row),
                expected
            );
        }
    }

    #[test]
    fn fit_tolerates_constant_feature_column() {
        // The second feature never varies, making it collinear with the
        // intercept; the fit must still predict correctly.
        let x: Vec<Vec<f64>> = (0..15).map(|i| vec![i as f64, 2024.0]).collect();
        let y: Vec<f64> = x.iter().map(|row| 10.0 + 0.5 * row[0]).collect();

        let model = LinearModel::fit(&x, &y).unwrap();
        for (row, expected) in x.iter().zip(&y) {
            assert!((model.predict(row) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn fit_rejects_empty_or_ragged_input() {
        assert!(LinearModel::fit(&[], &[]).is_err());
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(LinearModel::fit(&ragged, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn scoring_helpers_match_known_values() {
        let observed = [1.0, 2.0, 3.0, 4.0];
        let perfect = observed;
        assert_eq!(mean_squared_error(&observed, &perfect), 0.0);
        assert_eq!(r2_score(&observed, &perfect), 1.0);

        let off_by_one: Vec<f64> = observed.iter().map(|v| v + 1.0).collect();
        assert_eq!(mean_squared_error(&observed, &off_by_one), 1.0);
        // ss_total = 5, ss_residual = 4
        assert!((r2_score(&observed, &off_by_one) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn r2_of_constant_observations_is_zero() {
        assert_eq!(r2_score(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]), 0.0);
    }
}
