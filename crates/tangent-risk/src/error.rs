//! Errors raised while deriving return statistics or setting up a search.

use crate::covariance::CovarianceError;
use thiserror::Error;

/// Risk computation errors
#[derive(Debug, Error)]
pub enum RiskError {
    /// Covariance estimation error
    #[error("Covariance error: {0}")]
    Covariance(#[from] CovarianceError),

    /// Number of assets disagrees between inputs
    #[error("Dimension mismatch: expected {expected} assets, got {actual}")]
    DimensionMismatch {
        /// Expected number of assets
        expected: usize,
        /// Actual number of assets
        actual: usize,
    },

    /// Not enough observations
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// A price for which the log return is undefined
    #[error("Invalid price {price} at row {row}, column {column}")]
    InvalidPrice {
        /// Row index in the price table
        row: usize,
        /// Column index in the price table
        column: usize,
        /// Offending value
        price: f64,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The optimization executor failed
    #[error("Solver error: {0}")]
    Solver(String),
}
