//! Plain-text tables for terminal output.

use crate::result::OptimizationResult;
use ndarray::{Array1, Array2};
use std::fmt;
use tangent_risk::RatioKind;

const WIDTH: usize = 60;

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

impl OptimizationResult {
    /// Render the allocation and its statistics as an ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let (ratio_label, risk_label) = match self.ratio_kind {
            RatioKind::Sharpe => ("Sharpe Ratio", "Volatility"),
            RatioKind::Sortino => ("Sortino Ratio", "Downside Deviation"),
        };

        let mut output = String::new();

        output.push_str(&format!("\nOptimal Portfolio ({})\n", self.ratio_kind));
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');

        output.push_str(&format!("{:<20} {:>12}\n", "Ticker", "Weight"));
        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');

        for (ticker, weight) in self.allocations() {
            output.push_str(&format!("{:<20} {:>11.2}%\n", ticker, weight * 100.0));
        }

        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');

        output.push_str(&format!(
            "{:<20} {:>11.2}%\n",
            "Annual Return",
            self.annualized_return * 100.0
        ));
        output.push_str(&format!(
            "{:<20} {:>11.2}%\n",
            risk_label,
            self.annualized_risk * 100.0
        ));
        output.push_str(&format!("{:<20} {:>12.4}\n", ratio_label, self.ratio));
        output.push_str(&format!("{:<20} {:>12}\n", "Solver", self.status));
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');

        output
    }
}

/// Render mean returns and the covariance matrix of a return history.
///
/// Means are shown per period and annualized (compounded); the covariance is
/// shown per period.
pub fn render_statistics(
    tickers: &[String],
    mean: &Array1<f64>,
    covariance: &Array2<f64>,
    periods_per_year: f64,
) -> String {
    let mut output = String::new();

    output.push_str("\nReturn Statistics\n");
    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');
    output.push_str(&format!(
        "{:<12} {:>14} {:>14}\n",
        "Ticker", "Mean (log)", "Annualized"
    ));
    output.push_str(&"-".repeat(WIDTH));
    output.push('\n');

    for (ticker, &mu) in tickers.iter().zip(mean.iter()) {
        output.push_str(&format!(
            "{:<12} {:>14.6} {:>13.2}%\n",
            ticker,
            mu,
            (mu * periods_per_year).exp_m1() * 100.0
        ));
    }

    output.push_str("\nCovariance\n");
    output.push_str(&format!("{:<12}", ""));
    for ticker in tickers {
        output.push_str(&format!(" {:>12}", ticker));
    }
    output.push('\n');

    for (ticker, row) in tickers.iter().zip(covariance.rows()) {
        output.push_str(&format!("{:<12}", ticker));
        for value in row {
            output.push_str(&format!(" {:>12.3e}", value));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tangent_risk::SolverStatus;

    #[test]
    fn test_ascii_table_sortino_labels() {
        let result = OptimizationResult {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
            weights: vec![0.75, 0.25],
            annualized_return: 0.12,
            annualized_risk: 0.08,
            ratio: 1.5,
            ratio_kind: RatioKind::Sortino,
            status: SolverStatus::MaxIterations,
        };

        let table = result.to_ascii_table();
        assert!(table.contains("Optimal Portfolio (sortino)"));
        assert!(table.contains("Downside Deviation"));
        assert!(table.contains("75.00%"));
        assert!(table.contains("max_iterations"));
        assert_eq!(result.to_string(), table);
    }

    #[test]
    fn test_render_statistics() {
        let tickers = vec!["AAPL".to_string(), "MSFT".to_string()];
        let text = render_statistics(
            &tickers,
            &array![0.001, 0.0005],
            &array![[0.0004, 0.0001], [0.0001, 0.0002]],
            252.0,
        );

        assert!(text.contains("AAPL"));
        assert!(text.contains("0.001000"));
        assert!(text.contains("Covariance"));
        assert!(text.contains("4.000e-4"));
    }
}
