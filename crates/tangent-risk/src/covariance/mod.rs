//! Return covariance estimation
//!
//! Provides the sample covariance of asset returns used by the Sharpe
//! objective, plus eigenvalue utilities for checking the estimate.

pub mod spectrum;

pub use spectrum::CovarianceSpectrum;

use ndarray::{Array2, Axis};
use thiserror::Error;

/// Errors that can occur during covariance estimation
#[derive(Debug, Error)]
pub enum CovarianceError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Input contains NaN or infinite values
    #[error("Returns contain non-finite values")]
    NonFinite,
}

/// Trait for covariance matrix estimators
pub trait CovarianceEstimator {
    /// Estimate the covariance matrix from asset returns
    ///
    /// # Arguments
    /// * `returns` - Matrix where each row is a time period and each column is an asset
    ///
    /// # Returns
    /// * Estimated covariance matrix (N x N where N is number of assets)
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError>;
}

/// Unbiased sample covariance (`N - 1` denominator).
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCovarianceEstimator;

impl CovarianceEstimator for SampleCovarianceEstimator {
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        let n_periods = returns.nrows();

        if n_periods < 2 {
            return Err(CovarianceError::InsufficientData {
                required: 2,
                actual: n_periods,
            });
        }

        if returns.iter().any(|v| !v.is_finite()) {
            return Err(CovarianceError::NonFinite);
        }

        let Some(mean) = returns.mean_axis(Axis(0)) else {
            return Err(CovarianceError::InsufficientData {
                required: 2,
                actual: n_periods,
            });
        };

        let centered = returns - &mean;
        let cov = centered.t().dot(&centered) / (n_periods - 1) as f64;

        // Force exact symmetry; the product can differ in the last bit.
        Ok((&cov + &cov.t()) / 2.0)
    }
}
