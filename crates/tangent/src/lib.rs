#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tangent-finance/tangent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod optimizer;

// Re-export main types from sub-crates
pub use tangent_data as data;
pub use tangent_output as output;
pub use tangent_risk as risk;

pub use config::EngineConfig;
pub use engine::OptimizationEngine;
pub use error::{OptimizerError, Result};
pub use optimizer::PortfolioOptimizer;

pub use tangent_data::{
    CsvPriceProvider, PriceHistoryProvider, PriceTable, StaticPriceProvider, TickerSet,
    YahooPriceProvider,
};
pub use tangent_output::{OptimizationResponse, OptimizationResult};
pub use tangent_risk::{RatioKind, SolverConfig, SolverStatus};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
