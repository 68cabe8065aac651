//! Portfolio optimizer facade.

use crate::config::EngineConfig;
use crate::engine::OptimizationEngine;
use crate::error::{OptimizerError, Result};
use tangent_data::{PriceHistoryProvider, PriceTable, TickerSet};
use tangent_output::OptimizationResult;
use tangent_risk::{RatioKind, ReturnStatistics};
use tokio::time::timeout;
use tracing::info;

/// Fetches price history and optimizes a portfolio over it.
///
/// Only the fetch is asynchronous; the optimization itself runs on the
/// calling task.
#[derive(Debug)]
pub struct PortfolioOptimizer<P> {
    provider: P,
    engine: OptimizationEngine,
}

impl<P: PriceHistoryProvider> PortfolioOptimizer<P> {
    /// Create an optimizer with the default configuration.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            engine: OptimizationEngine::default(),
        }
    }

    /// Create an optimizer with a custom configuration.
    pub fn with_config(provider: P, config: EngineConfig) -> Result<Self> {
        Ok(Self {
            provider,
            engine: OptimizationEngine::new(config)?,
        })
    }

    /// Active configuration
    pub const fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Synchronous core
    pub const fn engine(&self) -> &OptimizationEngine {
        &self.engine
    }

    /// Price provider
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch aligned price history, bounded by the configured timeout.
    pub async fn fetch_prices(&self, tickers: &TickerSet) -> Result<PriceTable> {
        let config = self.engine.config();
        let table = timeout(config.fetch_timeout(), self.provider.fetch_prices(tickers))
            .await
            .map_err(|_| OptimizerError::Timeout {
                secs: config.fetch_timeout_secs,
            })??;

        info!(
            tickers = %tickers,
            rows = table.n_rows(),
            assets = table.n_assets(),
            "price history ready"
        );
        Ok(table)
    }

    /// Fetch price history and compute its return statistics.
    pub async fn fetch_statistics(&self, tickers: &TickerSet) -> Result<ReturnStatistics> {
        let prices = self.fetch_prices(tickers).await?;
        self.engine.statistics(&prices, tickers)
    }

    /// Find the allocation of `tickers` maximizing the `kind` ratio.
    ///
    /// # Errors
    /// * `Timeout` or `Data` if price history cannot be fetched
    /// * `Risk(DimensionMismatch)` if some ticker has no usable history
    pub async fn optimize_portfolio(
        &self,
        tickers: &TickerSet,
        risk_free_rate: f64,
        kind: RatioKind,
    ) -> Result<OptimizationResult> {
        let prices = self.fetch_prices(tickers).await?;
        self.optimize_prices(&prices, tickers, risk_free_rate, kind)
    }

    /// Optimize over price history that is already available.
    pub fn optimize_prices(
        &self,
        prices: &PriceTable,
        tickers: &TickerSet,
        risk_free_rate: f64,
        kind: RatioKind,
    ) -> Result<OptimizationResult> {
        self.engine
            .optimize_prices(prices, tickers, risk_free_rate, kind)
    }
}
