//! The optimizer's final, rounded result.

use serde::{Deserialize, Serialize};
use tangent_risk::{RatioKind, SolverStatus};

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Round weights to `decimals` places while keeping their sum exact.
///
/// Largest-remainder rounding: each weight is floored to the grid, then the
/// missing units go to the weights with the largest remainders (ties to the
/// earlier asset). Negative inputs are treated as zero.
pub fn round_weights(weights: &[f64], decimals: u32) -> Vec<f64> {
    let scale = 10f64.powi(decimals as i32);
    let total_units = scale.round() as i64;

    let scaled: Vec<f64> = weights.iter().map(|w| w.max(0.0) * scale).collect();
    let mut units: Vec<i64> = scaled.iter().map(|s| s.floor() as i64).collect();
    let shortfall = (total_units - units.iter().sum::<i64>()).max(0) as usize;

    let mut order: Vec<usize> = (0..scaled.len()).collect();
    order.sort_by(|&a, &b| {
        let rem_a = scaled[a] - scaled[a].floor();
        let rem_b = scaled[b] - scaled[b].floor();
        rem_b.total_cmp(&rem_a).then(a.cmp(&b))
    });

    for &i in order.iter().cycle().take(shortfall) {
        units[i] += 1;
    }

    units.iter().map(|&u| u as f64 / scale).collect()
}

/// Optimal allocation and its annualized statistics.
///
/// Weights follow the order of `tickers`. Risk is volatility for the Sharpe
/// ratio and downside deviation for the Sortino ratio. A ratio whose risk
/// was zero or undefined is reported as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Asset identifiers, in weight order.
    pub tickers: Vec<String>,

    /// Long-only weights summing to one.
    pub weights: Vec<f64>,

    /// Compounded annual return (fraction, not percent).
    pub annualized_return: f64,

    /// Annualized risk (fraction, not percent).
    pub annualized_risk: f64,

    /// Maximized ratio.
    pub ratio: f64,

    /// Which ratio was maximized.
    pub ratio_kind: RatioKind,

    /// How the search ended.
    pub status: SolverStatus,
}

impl OptimizationResult {
    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Weight assigned to `ticker`, if it is part of the result.
    pub fn weight_of(&self, ticker: &str) -> Option<f64> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .and_then(|i| self.weights.get(i).copied())
    }

    /// `(ticker, weight)` pairs in order.
    pub fn allocations(&self) -> impl Iterator<Item = (&str, f64)> {
        self.tickers
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }

    /// Whether the solver met a stopping criterion.
    pub const fn is_converged(&self) -> bool {
        self.status.is_converged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> OptimizationResult {
        OptimizationResult {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
            weights: vec![0.6, 0.4],
            annualized_return: 0.25,
            annualized_risk: 0.2,
            ratio: 1.25,
            ratio_kind: RatioKind::Sharpe,
            status: SolverStatus::Converged,
        }
    }

    #[rstest]
    #[case(0.123456, 4, 0.1235)]
    #[case(12.3456, 2, 12.35)]
    #[case(-0.00004, 4, -0.0)]
    #[case(1.0, 0, 1.0)]
    fn test_round_to(#[case] value: f64, #[case] decimals: u32, #[case] expected: f64) {
        assert_eq!(round_to(value, decimals), expected);
    }

    #[test]
    fn test_round_weights_keeps_unit_sum() {
        let rounded = round_weights(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0], 4);
        assert_eq!(rounded, vec![0.3334, 0.3333, 0.3333]);

        let units: i64 = rounded.iter().map(|w| (w * 1e4).round() as i64).sum();
        assert_eq!(units, 10_000);
    }

    #[test]
    fn test_round_weights_largest_remainder() {
        // Remainders 0.6, 0.3 and 0.1 units: the first one gets the spare unit
        let rounded = round_weights(&[0.12346, 0.45673, 0.41981], 4);
        assert_eq!(rounded, vec![0.1235, 0.4567, 0.4198]);
    }

    #[test]
    fn test_round_weights_clamps_negative_noise() {
        let rounded = round_weights(&[-1e-17, 0.7, 0.3], 4);
        assert_eq!(rounded, vec![0.0, 0.7, 0.3]);
    }

    #[test]
    fn test_lookup_by_ticker() {
        let result = sample();
        assert_eq!(result.weight_of("MSFT"), Some(0.4));
        assert_eq!(result.weight_of("TSLA"), None);
        assert_eq!(result.total_weight(), 1.0);
        assert!(result.is_converged());
    }

    #[test]
    fn test_allocations_preserve_order() {
        let pairs: Vec<_> = sample().allocations().map(|(t, w)| (t.to_string(), w)).collect();
        assert_eq!(pairs, vec![("AAPL".to_string(), 0.6), ("MSFT".to_string(), 0.4)]);
    }
}
