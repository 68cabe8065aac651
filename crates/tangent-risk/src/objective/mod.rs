//! Risk-adjusted ratio objectives
//!
//! Each objective scores a long-only weight vector by an annualized ratio of
//! excess return to risk. Annual return compounds the mean log return:
//!
//! R = exp(P * μ·w) - 1
//!
//! where P is the number of periods per year. Objectives hold only
//! immutable inputs; the weights are passed to every call.

mod sharpe;
mod sortino;

pub use sharpe::SharpeObjective;
pub use sortino::SortinoObjective;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Which ratio to maximize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioKind {
    /// Excess return over volatility
    #[default]
    Sharpe,
    /// Excess return over downside deviation
    Sortino,
}

impl fmt::Display for RatioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sharpe => write!(f, "sharpe"),
            Self::Sortino => write!(f, "sortino"),
        }
    }
}

impl FromStr for RatioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sharpe" => Ok(Self::Sharpe),
            "sortino" => Ok(Self::Sortino),
            other => Err(format!("unknown ratio '{other}', expected sharpe or sortino")),
        }
    }
}

/// Annualized statistics of one weight vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioEvaluation {
    /// Compounded annual return
    pub annualized_return: f64,
    /// Annualized volatility or downside deviation
    pub annualized_risk: f64,
    /// Excess return over risk; `None` when risk is zero or not finite
    pub ratio: Option<f64>,
}

impl RatioEvaluation {
    /// Build an evaluation, leaving the ratio undefined for degenerate risk.
    pub fn new(annualized_return: f64, annualized_risk: f64, risk_free_rate: f64) -> Self {
        let ratio = if annualized_risk.is_finite() && annualized_risk > 0.0 {
            Some((annualized_return - risk_free_rate) / annualized_risk)
        } else {
            None
        };

        Self {
            annualized_return,
            annualized_risk,
            ratio,
        }
    }

    /// Quantity minimized by the optimizer: the negated ratio, or `+∞` when
    /// the ratio is undefined.
    pub fn cost(&self) -> f64 {
        match self.ratio {
            Some(ratio) if ratio.is_finite() => -ratio,
            _ => f64::INFINITY,
        }
    }
}

/// A ratio to maximize over portfolio weights.
pub trait RatioObjective: Send + Sync {
    /// Which ratio this is
    fn kind(&self) -> RatioKind;

    /// Number of assets the weights must cover
    fn n_assets(&self) -> usize;

    /// Annualized return, risk and ratio of `weights`
    fn evaluate(&self, weights: &Array1<f64>) -> RatioEvaluation;

    /// Negated ratio of `weights`, `+∞` if the ratio is undefined
    fn cost(&self, weights: &Array1<f64>) -> f64 {
        self.evaluate(weights).cost()
    }
}

/// Compounded annual return of a mean per-period log return.
pub(crate) fn annualize_log_return(mean_log_return: f64, periods_per_year: f64) -> f64 {
    (mean_log_return * periods_per_year).exp_m1()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sharpe", RatioKind::Sharpe)]
    #[case("Sortino", RatioKind::Sortino)]
    #[case(" SHARPE ", RatioKind::Sharpe)]
    fn test_parse_ratio_kind(#[case] input: &str, #[case] expected: RatioKind) {
        assert_eq!(input.parse::<RatioKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_ratio() {
        assert!("calmar".parse::<RatioKind>().is_err());
    }

    #[test]
    fn test_ratio_kind_serde() {
        let json = serde_json::to_string(&RatioKind::Sortino).unwrap();
        assert_eq!(json, "\"sortino\"");
        assert_eq!(RatioKind::default(), RatioKind::Sharpe);
        assert_eq!(RatioKind::Sortino.to_string(), "sortino");
    }

    #[rstest]
    #[case(0.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_degenerate_risk_has_no_ratio(#[case] risk: f64) {
        let eval = RatioEvaluation::new(0.1, risk, 0.0);
        assert_eq!(eval.ratio, None);
        assert_eq!(eval.cost(), f64::INFINITY);
    }

    #[test]
    fn test_cost_is_negated_ratio() {
        let eval = RatioEvaluation::new(0.12, 0.2, 0.02);
        assert_eq!(eval.ratio, Some((0.12 - 0.02) / 0.2));
        assert_eq!(eval.cost(), -(0.12 - 0.02) / 0.2);
    }
}
