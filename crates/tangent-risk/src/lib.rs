#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tangent-finance/tangent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod covariance;
pub mod error;
pub mod objective;
pub mod returns;
pub mod solver;

// Re-export main types
pub use covariance::{
    CovarianceError, CovarianceEstimator, CovarianceSpectrum, SampleCovarianceEstimator,
};
pub use error::RiskError;
pub use objective::{
    RatioEvaluation, RatioKind, RatioObjective, SharpeObjective, SortinoObjective,
    TRADING_DAYS_PER_YEAR,
};
pub use returns::{ReturnCalculator, ReturnStatistics};
pub use solver::{ConstrainedOptimizer, Solution, SolverConfig, SolverStatus};
