//! Log-return statistics
//!
//! Converts an aligned price matrix (rows = ascending dates, columns =
//! assets) into one-period log returns `r[t] = ln(p[t] / p[t-1])`, together
//! with their mean vector and sample covariance.

use crate::covariance::{CovarianceEstimator, CovarianceSpectrum, SampleCovarianceEstimator};
use crate::error::RiskError;
use ndarray::{Array1, Array2, Axis, s};

/// Derives return statistics from aligned prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnCalculator;

impl ReturnCalculator {
    /// Create a new calculator
    pub const fn new() -> Self {
        Self
    }

    /// One-period log returns of every column.
    ///
    /// The first row has no predecessor and is dropped, so the result has
    /// one row fewer than `prices`.
    ///
    /// # Errors
    /// * `InsufficientData` if fewer than two price rows are given
    /// * `InvalidPrice` if any price is non-positive or non-finite
    pub fn log_returns(&self, prices: &Array2<f64>) -> Result<Array2<f64>, RiskError> {
        let n_rows = prices.nrows();
        if n_rows < 2 {
            return Err(RiskError::InsufficientData {
                required: 2,
                actual: n_rows,
            });
        }

        if let Some(((row, column), &price)) = prices
            .indexed_iter()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(RiskError::InvalidPrice { row, column, price });
        }

        let current = prices.slice(s![1.., ..]);
        let previous = prices.slice(s![..-1, ..]);

        Ok((&current / &previous).mapv(f64::ln))
    }

    /// Log returns, mean vector and covariance for `expected_assets` assets.
    ///
    /// # Errors
    /// * `DimensionMismatch` if the price matrix does not have
    ///   `expected_assets` columns (an asset was dropped upstream)
    /// * Any error from [`log_returns`](Self::log_returns)
    pub fn compute(
        &self,
        prices: &Array2<f64>,
        expected_assets: usize,
    ) -> Result<ReturnStatistics, RiskError> {
        if prices.ncols() != expected_assets {
            return Err(RiskError::DimensionMismatch {
                expected: expected_assets,
                actual: prices.ncols(),
            });
        }

        let returns = self.log_returns(prices)?;
        let covariance = SampleCovarianceEstimator.estimate(&returns)?;
        let mean = returns
            .mean_axis(Axis(0))
            .ok_or(RiskError::InsufficientData {
                required: 2,
                actual: prices.nrows(),
            })?;

        Ok(ReturnStatistics {
            returns,
            mean,
            covariance,
        })
    }
}

/// Log-return table and its first two moments.
#[derive(Debug, Clone)]
pub struct ReturnStatistics {
    returns: Array2<f64>,
    mean: Array1<f64>,
    covariance: Array2<f64>,
}

impl ReturnStatistics {
    /// Assemble statistics from precomputed moments.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the shapes disagree.
    pub fn from_parts(
        returns: Array2<f64>,
        mean: Array1<f64>,
        covariance: Array2<f64>,
    ) -> Result<Self, RiskError> {
        let stats = Self {
            returns,
            mean,
            covariance,
        };
        stats.validate(stats.n_assets())?;
        Ok(stats)
    }

    /// Return table (periods x assets)
    pub const fn returns(&self) -> &Array2<f64> {
        &self.returns
    }

    /// Mean log return per period
    pub const fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Sample covariance of log returns
    pub const fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Number of assets
    pub fn n_assets(&self) -> usize {
        self.mean.len()
    }

    /// Number of return periods
    pub fn n_periods(&self) -> usize {
        self.returns.nrows()
    }

    /// Check that every component describes exactly `n` assets.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` naming the first disagreeing size.
    pub fn validate(&self, n: usize) -> Result<(), RiskError> {
        let sizes = [
            self.mean.len(),
            self.returns.ncols(),
            self.covariance.nrows(),
            self.covariance.ncols(),
        ];

        match sizes.into_iter().find(|&size| size != n) {
            Some(actual) => Err(RiskError::DimensionMismatch {
                expected: n,
                actual,
            }),
            None => Ok(()),
        }
    }

    /// Eigenvalue spectrum of the covariance.
    ///
    /// # Errors
    /// Returns `Covariance` if the covariance holds non-finite entries.
    pub fn covariance_spectrum(&self) -> Result<CovarianceSpectrum, RiskError> {
        Ok(CovarianceSpectrum::of(&self.covariance)?)
    }
}
