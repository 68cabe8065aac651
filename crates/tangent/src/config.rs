//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! risk_free_rate = 0.02
//! fetch_timeout_secs = 60
//!
//! [solver]
//! max_iterations = 200
//! ```

use crate::error::{OptimizerError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tangent_risk::{SolverConfig, TRADING_DAYS_PER_YEAR};

/// Highest supported rounding precision.
const MAX_PRECISION: u32 = 10;

/// Settings shared by every optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Periods per year used to annualize daily statistics
    pub periods_per_year: f64,
    /// Default annual risk-free rate
    pub risk_free_rate: f64,
    /// Per-period return below which Sortino counts a shortfall
    pub downside_threshold: f64,
    /// Decimal places of reported weights and statistics
    pub precision: u32,
    /// Timeout for fetching price history
    pub fetch_timeout_secs: u64,
    /// First date of requested price history
    pub history_start: NaiveDate,
    /// Tickers fetched concurrently
    pub concurrency: usize,
    /// Pause after each Yahoo Finance request, in milliseconds
    pub rate_limit_ms: u64,
    /// Solver settings
    pub solver: SolverConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR,
            risk_free_rate: 0.0,
            downside_threshold: 0.0,
            precision: 4,
            fetch_timeout_secs: 30,
            history_start: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap_or_default(),
            concurrency: 4,
            rate_limit_ms: 250,
            solver: SolverConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            OptimizerError::Config(format!(
                "failed to read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| OptimizerError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<()> {
        if !(self.periods_per_year.is_finite() && self.periods_per_year > 0.0) {
            return Err(OptimizerError::Config(format!(
                "periods_per_year must be positive, got {}",
                self.periods_per_year
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(OptimizerError::Config(
                "risk_free_rate must be finite".to_string(),
            ));
        }
        if !self.downside_threshold.is_finite() {
            return Err(OptimizerError::Config(
                "downside_threshold must be finite".to_string(),
            ));
        }
        if self.precision > MAX_PRECISION {
            return Err(OptimizerError::Config(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(OptimizerError::Config(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(OptimizerError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        self.solver
            .validate()
            .map_err(|e| OptimizerError::Config(e.to_string()))
    }

    /// Fetch timeout as a duration
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Pause between Yahoo Finance requests
    pub const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}
