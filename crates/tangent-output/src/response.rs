//! Outbound JSON contract.
//!
//! ```json
//! {
//!   "Optimized weights": [0.6, 0.4],
//!   "Yearly returns": 25.0,
//!   "Yearly volatility": 20.0,
//!   "Sharpe ratio": 1.25
//! }
//! ```
//!
//! Returns and volatility are percentages rounded to two decimals. The
//! `"Sharpe ratio"` and `"Yearly volatility"` keys are kept for the Sortino
//! ratio as well, carrying the Sortino ratio and the downside deviation.

use crate::result::{OptimizationResult, round_to};
use serde::{Deserialize, Serialize};

/// Decimal places of percentage figures.
const PERCENT_DECIMALS: u32 = 2;

/// JSON body returned to callers of the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    /// Weights in ticker order.
    #[serde(rename = "Optimized weights")]
    pub weights: Vec<f64>,

    /// Annual return, percent.
    #[serde(rename = "Yearly returns")]
    pub yearly_returns: f64,

    /// Annual volatility or downside deviation, percent.
    #[serde(rename = "Yearly volatility")]
    pub yearly_volatility: f64,

    /// Maximized ratio.
    #[serde(rename = "Sharpe ratio")]
    pub ratio: f64,
}

impl From<&OptimizationResult> for OptimizationResponse {
    fn from(result: &OptimizationResult) -> Self {
        Self {
            weights: result.weights.clone(),
            yearly_returns: round_to(result.annualized_return * 100.0, PERCENT_DECIMALS),
            yearly_volatility: round_to(result.annualized_risk * 100.0, PERCENT_DECIMALS),
            ratio: result.ratio,
        }
    }
}

impl OptimizationResponse {
    /// Compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
