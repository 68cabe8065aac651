//! Synchronous optimization pipeline.
//!
//! prices -> log-return statistics -> ratio objective -> simplex search ->
//! rounded [`OptimizationResult`]. Nothing here performs I/O.

use crate::config::EngineConfig;
use crate::error::Result;
use ndarray::{Array1, Array2};
use std::borrow::Cow;
use tangent_data::{PriceTable, TickerSet};
use tangent_output::{OptimizationResult, round_to, round_weights};
use tangent_risk::{
    ConstrainedOptimizer, RatioKind, RatioObjective, ReturnCalculator, ReturnStatistics,
    RiskError, SharpeObjective, SortinoObjective,
};
use tracing::{debug, info, warn};

/// Eigenvalues down to `-PSD_TOLERANCE` count as zero.
const PSD_TOLERANCE: f64 = 1e-12;

/// Condition numbers above this leave the search with nearly flat directions.
const MAX_CONDITION_NUMBER: f64 = 1e10;

/// Optimizer core operating on already aligned prices.
#[derive(Debug, Clone, Default)]
pub struct OptimizationEngine {
    config: EngineConfig,
    solver: ConstrainedOptimizer,
}

impl OptimizationEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let solver = ConstrainedOptimizer::new(config.solver)?;
        Ok(Self { config, solver })
    }

    /// Active configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Log-return statistics of `prices` for the requested tickers.
    ///
    /// Columns are matched to `tickers` by symbol, so the statistics follow
    /// the ticker order whatever the column order of the table.
    ///
    /// # Errors
    /// `DimensionMismatch` if the table has no column for some requested
    /// ticker, plus the errors of [`ReturnCalculator::compute`].
    pub fn statistics(&self, prices: &PriceTable, tickers: &TickerSet) -> Result<ReturnStatistics> {
        let aligned = aligned_prices(prices, tickers)?;
        let stats = ReturnCalculator::new().compute(&aligned, tickers.len())?;
        stats.validate(tickers.len())?;

        match stats.covariance_spectrum() {
            Ok(spectrum) if !spectrum.is_positive_semidefinite(PSD_TOLERANCE) => {
                warn!(
                    tickers = %tickers,
                    smallest_eigenvalue = spectrum.smallest(),
                    "sample covariance is not positive-semidefinite"
                );
            }
            Ok(spectrum) if spectrum.condition_number() > MAX_CONDITION_NUMBER => {
                warn!(
                    tickers = %tickers,
                    condition_number = spectrum.condition_number(),
                    "sample covariance is nearly singular, some assets are almost collinear"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not inspect covariance spectrum"),
        }

        debug!(
            periods = stats.n_periods(),
            assets = stats.n_assets(),
            "computed return statistics"
        );
        Ok(stats)
    }

    /// Build the objective selected by `kind`.
    pub fn objective(
        &self,
        stats: &ReturnStatistics,
        risk_free_rate: f64,
        kind: RatioKind,
    ) -> Result<Box<dyn RatioObjective>> {
        let periods = self.config.periods_per_year;
        let objective: Box<dyn RatioObjective> = match kind {
            RatioKind::Sharpe => Box::new(
                SharpeObjective::from_statistics(stats, risk_free_rate)?
                    .with_periods_per_year(periods),
            ),
            RatioKind::Sortino => Box::new(
                SortinoObjective::from_statistics(stats, risk_free_rate)?
                    .with_threshold(self.config.downside_threshold)
                    .with_periods_per_year(periods),
            ),
        };
        Ok(objective)
    }

    /// Find the weights maximizing `kind` over aligned prices.
    ///
    /// Weights and statistics are rounded to the configured precision; the
    /// weights keep summing to exactly one grid unit total.
    pub fn optimize_prices(
        &self,
        prices: &PriceTable,
        tickers: &TickerSet,
        risk_free_rate: f64,
        kind: RatioKind,
    ) -> Result<OptimizationResult> {
        if !risk_free_rate.is_finite() {
            return Err(RiskError::InvalidParameter(format!(
                "risk-free rate must be finite, got {risk_free_rate}"
            ))
            .into());
        }

        let stats = self.statistics(prices, tickers)?;
        let objective = self.objective(&stats, risk_free_rate, kind)?;
        let solution = self.solver.maximize_ratio(objective.as_ref())?;

        // Report the statistics of the weights actually returned
        let precision = self.config.precision;
        let weights = round_weights(&solution.weights.to_vec(), precision);
        let evaluation = objective.evaluate(&Array1::from(weights.clone()));

        let result = OptimizationResult {
            tickers: tickers.iter().cloned().collect(),
            weights,
            annualized_return: round_to(evaluation.annualized_return, precision),
            annualized_risk: round_to(evaluation.annualized_risk, precision),
            ratio: round_to(evaluation.ratio.unwrap_or(0.0), precision),
            ratio_kind: kind,
            status: solution.status,
        };

        info!(
            ratio = %kind,
            value = result.ratio,
            status = %result.status,
            iterations = solution.iterations,
            "optimization finished"
        );

        Ok(result)
    }
}

/// Price columns in the order of `tickers`.
fn aligned_prices<'a>(prices: &'a PriceTable, tickers: &TickerSet) -> Result<Cow<'a, Array2<f64>>> {
    if prices.tickers() == tickers.as_slice() {
        return Ok(Cow::Borrowed(prices.prices()));
    }

    let columns: Vec<_> = tickers
        .iter()
        .filter_map(|ticker| prices.column(ticker))
        .collect();

    if columns.len() != tickers.len() {
        let missing: Vec<&str> = tickers
            .iter()
            .filter(|ticker| prices.column(ticker).is_none())
            .map(String::as_str)
            .collect();
        warn!(?missing, "no price history for some tickers");
        return Err(RiskError::DimensionMismatch {
            expected: tickers.len(),
            actual: columns.len(),
        }
        .into());
    }

    debug!(columns = ?prices.tickers(), "reordering price columns to ticker order");
    Ok(Cow::Owned(Array2::from_shape_fn(
        (prices.n_rows(), columns.len()),
        |(t, j)| columns[j][t],
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptimizerError;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use tangent_risk::SolverStatus;

    fn table(tickers: &[&str], prices: Array2<f64>) -> PriceTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..prices.nrows() as u64)
            .map(|d| start + chrono::Days::new(d))
            .collect();
        PriceTable::new(
            dates,
            tickers.iter().map(|t| t.to_string()).collect(),
            prices,
        )
        .unwrap()
    }

    fn prices_from_returns(returns: &[Vec<f64>]) -> Array2<f64> {
        let n_assets = returns.len();
        let n_rows = returns[0].len() + 1;
        Array2::from_shape_fn((n_rows, n_assets), |(t, j)| {
            100.0 * returns[j][..t].iter().sum::<f64>().exp()
        })
    }

    #[test]
    fn test_exchangeable_assets_split_evenly() {
        let a = vec![0.01, -0.004, 0.006, -0.002, 0.008, -0.005];
        let b = vec![-0.004, 0.01, -0.002, 0.006, -0.005, 0.008];
        let prices = table(&["A", "B"], prices_from_returns(&[a, b]));
        let tickers = TickerSet::new(["A", "B"]).unwrap();

        let result = OptimizationEngine::default()
            .optimize_prices(&prices, &tickers, 0.0, RatioKind::Sharpe)
            .unwrap();

        assert_abs_diff_eq!(result.weights[0], 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(result.weights[1], 0.5, epsilon = 1e-4);
        assert_eq!(result.status, SolverStatus::Converged);
    }

    #[test]
    fn test_single_ticker() {
        let prices = table(&["SPY"], prices_from_returns(&[vec![0.01, -0.02, 0.015]]));
        let tickers = TickerSet::new(["SPY"]).unwrap();

        let result = OptimizationEngine::default()
            .optimize_prices(&prices, &tickers, 0.0, RatioKind::Sortino)
            .unwrap();

        assert_eq!(result.weights, vec![1.0]);
        assert_eq!(result.status, SolverStatus::Converged);
    }

    #[test]
    fn test_missing_ticker_is_dimension_mismatch() {
        let prices = table(&["AAPL"], prices_from_returns(&[vec![0.01, 0.02]]));
        let tickers = TickerSet::new(["AAPL", "MSFT"]).unwrap();

        let err = OptimizationEngine::default()
            .optimize_prices(&prices, &tickers, 0.0, RatioKind::Sharpe)
            .unwrap_err();

        assert!(err.is_dimension_mismatch());
        assert!(matches!(
            err,
            OptimizerError::Risk(RiskError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_columns_follow_ticker_order() {
        // B drifts up, A drifts down
        let a = vec![-0.002, 0.001, -0.003, 0.0, -0.001, -0.002];
        let b = vec![0.004, 0.001, 0.003, -0.001, 0.005, 0.002];
        let returns = [a, b];
        let tickers = TickerSet::new(["B", "A"]).unwrap();
        let engine = OptimizationEngine::default();

        let in_order = engine
            .optimize_prices(
                &table(&["B", "A"], prices_from_returns(&[returns[1].clone(), returns[0].clone()])),
                &tickers,
                0.0,
                RatioKind::Sharpe,
            )
            .unwrap();
        let swapped = engine
            .optimize_prices(
                &table(&["A", "B"], prices_from_returns(&returns)),
                &tickers,
                0.0,
                RatioKind::Sharpe,
            )
            .unwrap();

        assert_eq!(swapped.tickers, vec!["B", "A"]);
        assert_eq!(swapped.weights, in_order.weights);
        assert!(swapped.weights[0] > swapped.weights[1]);
    }

    #[test]
    fn test_unrelated_columns_are_rejected() {
        let prices = table(
            &["MSFT", "AAPL"],
            prices_from_returns(&[vec![0.01, -0.02], vec![0.02, 0.01]]),
        );
        let tickers = TickerSet::new(["AAPL", "TSLA"]).unwrap();

        let err = OptimizationEngine::default()
            .statistics(&prices, &tickers)
            .unwrap_err();

        assert!(matches!(
            err,
            OptimizerError::Risk(RiskError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_reported_statistics_match_rounded_weights() {
        let a = vec![0.012, -0.004, 0.007, -0.009, 0.011, -0.002, 0.004];
        let b = vec![-0.003, 0.006, 0.002, 0.005, -0.004, 0.008, 0.001];
        let prices = table(&["A", "B"], prices_from_returns(&[a, b]));
        let tickers = TickerSet::new(["A", "B"]).unwrap();
        let engine = OptimizationEngine::default();

        let result = engine
            .optimize_prices(&prices, &tickers, 0.0, RatioKind::Sharpe)
            .unwrap();

        let stats = engine.statistics(&prices, &tickers).unwrap();
        let objective = engine.objective(&stats, 0.0, RatioKind::Sharpe).unwrap();
        let expected = objective.evaluate(&Array1::from(result.weights.clone()));

        assert_eq!(result.annualized_return, round_to(expected.annualized_return, 4));
        assert_eq!(result.annualized_risk, round_to(expected.annualized_risk, 4));
        assert_eq!(result.ratio, round_to(expected.ratio.unwrap(), 4));
    }

    #[test]
    fn test_collinear_assets_still_optimize() {
        // B moves exactly twice as much as A: rank-one covariance
        let a = vec![0.01, -0.004, 0.006, -0.002, 0.008];
        let b: Vec<f64> = a.iter().map(|r| 2.0 * r).collect();
        let prices = table(&["A", "B"], prices_from_returns(&[a, b]));
        let tickers = TickerSet::new(["A", "B"]).unwrap();
        let engine = OptimizationEngine::default();

        let spectrum = engine
            .statistics(&prices, &tickers)
            .unwrap()
            .covariance_spectrum()
            .unwrap();
        assert!(spectrum.condition_number() > MAX_CONDITION_NUMBER);

        let result = engine
            .optimize_prices(&prices, &tickers, 0.0, RatioKind::Sharpe)
            .unwrap();
        assert_abs_diff_eq!(result.total_weight(), 1.0, epsilon = 1e-12);
        assert!(result.weights.iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn test_flat_prices_report_zero_ratio() {
        let prices = table(&["A", "B"], Array2::from_elem((5, 2), 10.0));
        let tickers = TickerSet::new(["A", "B"]).unwrap();

        let result = OptimizationEngine::default()
            .optimize_prices(&prices, &tickers, 0.0, RatioKind::Sharpe)
            .unwrap();

        assert_eq!(result.status, SolverStatus::NonFiniteObjective);
        assert_eq!(result.ratio, 0.0);
        assert_eq!(result.weights, vec![0.5, 0.5]);
    }

    #[test]
    fn test_rejects_non_finite_risk_free_rate() {
        let prices = table(&["A"], prices_from_returns(&[vec![0.01, 0.02]]));
        let tickers = TickerSet::new(["A"]).unwrap();

        let result = OptimizationEngine::default().optimize_prices(
            &prices,
            &tickers,
            f64::NAN,
            RatioKind::Sharpe,
        );
        assert!(matches!(
            result,
            Err(OptimizerError::Risk(RiskError::InvalidParameter(_)))
        ));
    }
}
