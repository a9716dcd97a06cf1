//! Regression error metrics.

use serde::{Deserialize, Serialize};

/// Point-forecast error statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub n: usize,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error over non-zero actuals, as a fraction.
    /// `None` when every actual is zero.
    pub mape: Option<f64>,
}

impl Default for RegressionMetrics {
    fn default() -> Self {
        Self {
            n: 0,
            mae: 0.0,
            rmse: 0.0,
            mape: None,
        }
    }
}

impl RegressionMetrics {
    /// Compare predictions with actuals pairwise. Extra values on either side
    /// are ignored.
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return Self::default();
        }

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;
        let mut pct_n = 0usize;

        for (&a, &p) in actual.iter().zip(predicted) {
            let err = a - p;
            abs_sum += err.abs();
            sq_sum += err * err;
            if a != 0.0 {
                pct_sum += (err / a).abs();
                pct_n += 1;
            }
        }

        Self {
            n,
            mae: abs_sum / n as f64,
            rmse: (sq_sum / n as f64).sqrt(),
            mape: if pct_n > 0 {
                Some(pct_sum / pct_n as f64)
            } else {
                None
            },
        }
    }

    pub fn summary(&self) -> String {
        let mape = self
            .mape
            .map(|m| format!("{:.1}%", m * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "n={} | MAE: {:.3} | RMSE: {:.3} | MAPE: {}",
            self.n, self.mae, self.rmse, mape
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_forecast() {
        let m = RegressionMetrics::calculate(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(m.n, 3);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mape, Some(0.0));
    }

    #[test]
    fn test_known_errors() {
        let m = RegressionMetrics::calculate(&[10.0, 20.0, 0.0, 40.0], &[12.0, 18.0, 3.0, 40.0]);
        assert_relative_eq!(m.mae, 7.0 / 4.0);
        assert_relative_eq!(m.rmse, (17.0f64 / 4.0).sqrt());
        // Zero actual is skipped: (0.2 + 0.1 + 0.0) / 3
        assert_relative_eq!(m.mape.unwrap(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_all_zero_actuals() {
        let m = RegressionMetrics::calculate(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(m.mape, None);
        assert_relative_eq!(m.mae, 1.0);
        assert!(m.summary().contains("MAPE: n/a"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(RegressionMetrics::calculate(&[], &[]), RegressionMetrics::default());
    }
}
