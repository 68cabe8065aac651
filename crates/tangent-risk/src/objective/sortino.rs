//! Sortino ratio: excess return over annualized downside deviation.

use super::{RatioEvaluation, RatioKind, RatioObjective, TRADING_DAYS_PER_YEAR, annualize_log_return};
use crate::error::RiskError;
use crate::returns::ReturnStatistics;
use ndarray::{Array1, Array2, Axis};

/// Sortino ratio of a long-only portfolio.
///
/// Each period's portfolio log return `Σ w_i r[t, i]` is converted to a
/// simple return `s[t] = exp(.) - 1`, then
///
/// DD = sqrt(mean(min(s[t] - τ, 0)²)) * sqrt(P)
///
/// with the mean taken over all periods.
#[derive(Debug, Clone)]
pub struct SortinoObjective {
    returns: Array2<f64>,
    mean: Array1<f64>,
    risk_free_rate: f64,
    threshold: f64,
    periods_per_year: f64,
}

impl SortinoObjective {
    /// Create a Sortino objective from a log-return table (periods x assets).
    ///
    /// # Errors
    /// Returns `InsufficientData` for an empty table.
    pub fn new(returns: Array2<f64>, risk_free_rate: f64) -> Result<Self, RiskError> {
        let mean = returns
            .mean_axis(Axis(0))
            .ok_or(RiskError::InsufficientData {
                required: 1,
                actual: 0,
            })?;

        Ok(Self {
            returns,
            mean,
            risk_free_rate,
            threshold: 0.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        })
    }

    /// Create a Sortino objective from computed return statistics.
    pub fn from_statistics(stats: &ReturnStatistics, risk_free_rate: f64) -> Result<Self, RiskError> {
        Self::new(stats.returns().clone(), risk_free_rate)
    }

    /// Minimum acceptable per-period simple return (default 0).
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the annualization factor (default 252).
    pub const fn with_periods_per_year(mut self, periods_per_year: f64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }

    fn downside_deviation(&self, weights: &Array1<f64>) -> f64 {
        let portfolio = self.returns.dot(weights);
        let n_periods = portfolio.len() as f64;

        let shortfall_sq: f64 = portfolio
            .iter()
            .map(|r| (r.exp_m1() - self.threshold).min(0.0).powi(2))
            .sum();

        (shortfall_sq / n_periods).sqrt() * self.periods_per_year.sqrt()
    }
}

impl RatioObjective for SortinoObjective {
    fn kind(&self) -> RatioKind {
        RatioKind::Sortino
    }

    fn n_assets(&self) -> usize {
        self.mean.len()
    }

    fn evaluate(&self, weights: &Array1<f64>) -> RatioEvaluation {
        let annualized_return = annualize_log_return(self.mean.dot(weights), self.periods_per_year);
        let downside = self.downside_deviation(weights);

        RatioEvaluation::new(annualized_return, downside, self.risk_free_rate)
    }
}
