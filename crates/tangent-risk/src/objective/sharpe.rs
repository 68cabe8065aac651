//! Sharpe ratio: excess return over annualized volatility.

use super::{RatioEvaluation, RatioKind, RatioObjective, TRADING_DAYS_PER_YEAR, annualize_log_return};
use crate::error::RiskError;
use crate::returns::ReturnStatistics;
use ndarray::{Array1, Array2};

/// Sharpe ratio of a long-only portfolio.
///
/// σ = sqrt(wᵀ Σ w) * sqrt(P)
#[derive(Debug, Clone)]
pub struct SharpeObjective {
    mean: Array1<f64>,
    covariance: Array2<f64>,
    risk_free_rate: f64,
    periods_per_year: f64,
}

impl SharpeObjective {
    /// Create a Sharpe objective from mean log returns and their covariance.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the covariance is not `n x n` for the
    /// `n` assets in `mean`.
    pub fn new(
        mean: Array1<f64>,
        covariance: Array2<f64>,
        risk_free_rate: f64,
    ) -> Result<Self, RiskError> {
        let n = mean.len();
        for actual in [covariance.nrows(), covariance.ncols()] {
            if actual != n {
                return Err(RiskError::DimensionMismatch {
                    expected: n,
                    actual,
                });
            }
        }

        Ok(Self {
            mean,
            covariance,
            risk_free_rate,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        })
    }

    /// Create a Sharpe objective from computed return statistics.
    pub fn from_statistics(stats: &ReturnStatistics, risk_free_rate: f64) -> Result<Self, RiskError> {
        Self::new(stats.mean().clone(), stats.covariance().clone(), risk_free_rate)
    }

    /// Override the annualization factor (default 252).
    pub const fn with_periods_per_year(mut self, periods_per_year: f64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }
}

impl RatioObjective for SharpeObjective {
    fn kind(&self) -> RatioKind {
        RatioKind::Sharpe
    }

    fn n_assets(&self) -> usize {
        self.mean.len()
    }

    fn evaluate(&self, weights: &Array1<f64>) -> RatioEvaluation {
        let annualized_return = annualize_log_return(self.mean.dot(weights), self.periods_per_year);

        let variance = weights.dot(&self.covariance.dot(weights));
        // Rounding can leave a tiny negative variance for singular covariances
        let volatility = variance.max(0.0).sqrt() * self.periods_per_year.sqrt();

        RatioEvaluation::new(annualized_return, volatility, self.risk_free_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_sharpe_single_asset() {
        let objective = SharpeObjective::new(array![0.0004], array![[0.0001]], 0.02).unwrap();
        let eval = objective.evaluate(&array![1.0]);

        let expected_return = (0.0004_f64 * 252.0).exp() - 1.0;
        let expected_vol = 0.01 * 252.0_f64.sqrt();

        assert_abs_diff_eq!(eval.annualized_return, expected_return, epsilon = 1e-12);
        assert_abs_diff_eq!(eval.annualized_risk, expected_vol, epsilon = 1e-12);
        assert_abs_diff_eq!(
            eval.ratio.unwrap(),
            (expected_return - 0.02) / expected_vol,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sharpe_diversification_lowers_risk() {
        let objective = SharpeObjective::new(
            array![0.01, 0.01],
            array![[0.04, 0.0], [0.0, 0.04]],
            0.0,
        )
        .unwrap();

        let concentrated = objective.evaluate(&array![1.0, 0.0]);
        let balanced = objective.evaluate(&array![0.5, 0.5]);

        assert_abs_diff_eq!(concentrated.annualized_return, balanced.annualized_return);
        assert!(balanced.annualized_risk < concentrated.annualized_risk);
        assert!(objective.cost(&array![0.5, 0.5]) < objective.cost(&array![1.0, 0.0]));
    }

    #[test]
    fn test_zero_volatility_is_penalized() {
        let objective =
            SharpeObjective::new(array![0.001, 0.002], Array2::zeros((2, 2)), 0.0).unwrap();
        let eval = objective.evaluate(&array![0.5, 0.5]);

        assert_eq!(eval.annualized_risk, 0.0);
        assert_eq!(eval.ratio, None);
        assert_eq!(objective.cost(&array![0.5, 0.5]), f64::INFINITY);
    }

    #[test]
    fn test_periods_per_year_override() {
        let objective = SharpeObjective::new(array![0.01], array![[0.0004]], 0.0)
            .unwrap()
            .with_periods_per_year(12.0);
        let eval = objective.evaluate(&array![1.0]);

        assert_abs_diff_eq!(eval.annualized_return, 0.12_f64.exp_m1(), epsilon = 1e-12);
        assert_abs_diff_eq!(eval.annualized_risk, 0.02 * 12.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_mismatched_covariance() {
        let result = SharpeObjective::new(array![0.01, 0.02], array![[0.04]], 0.0);
        assert!(matches!(
            result,
            Err(RiskError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
