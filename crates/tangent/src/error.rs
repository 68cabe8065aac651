//! Errors surfaced by the optimizer facade.

use tangent_data::DataError;
use tangent_output::ExportError;
use tangent_risk::RiskError;
use thiserror::Error;

/// Result type for facade operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Everything that can stop an optimization run
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// Price history could not be fetched or aligned
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Return statistics or the search could not be set up
    #[error("Risk error: {0}")]
    Risk(#[from] RiskError),

    /// Result could not be written
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// The price fetch did not finish in time
    #[error("Price fetch timed out after {secs}s")]
    Timeout {
        /// Configured timeout in seconds
        secs: u64,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OptimizerError {
    /// Whether some requested ticker had no usable price history.
    pub const fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::Risk(RiskError::DimensionMismatch { .. }))
    }
}
