//! Subcommand implementations.

use crate::OutputFormat;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tangent::output::{ExportFormat, Exporter, render_statistics};
use tangent::{
    CsvPriceProvider, EngineConfig, OptimizationResult, PortfolioOptimizer, PriceHistoryProvider,
    RatioKind, TickerSet, YahooPriceProvider,
};
use tracing::{debug, info};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Arguments of `tangent optimize`.
pub(crate) struct OptimizeRequest {
    pub(crate) tickers: Vec<String>,
    pub(crate) kind: RatioKind,
    pub(crate) risk_free_rate: f64,
    pub(crate) format: OutputFormat,
    pub(crate) output: Option<PathBuf>,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tangent").join("config.toml"))
}

/// Explicit path, else the default location if it exists, else defaults.
pub(crate) fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    if let Some(path) = path {
        info!(path = %path.display(), "loading configuration");
        return Ok(EngineConfig::from_file(path)?);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "loading configuration");
            Ok(EngineConfig::from_file(path)?)
        }
        _ => {
            debug!("no configuration file, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

fn yahoo_provider(config: &EngineConfig) -> CliResult<YahooPriceProvider> {
    Ok(YahooPriceProvider::new()?
        .with_history_start(config.history_start)
        .with_concurrency(config.concurrency)
        .with_rate_limit(config.rate_limit()))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

pub(crate) async fn optimize(
    config: EngineConfig,
    prices: Option<PathBuf>,
    request: OptimizeRequest,
) -> CliResult<()> {
    match prices {
        Some(path) => {
            let optimizer = PortfolioOptimizer::with_config(CsvPriceProvider::new(path), config)?;
            run_optimize(&optimizer, request).await
        }
        None => {
            let optimizer = PortfolioOptimizer::with_config(yahoo_provider(&config)?, config)?;
            run_optimize(&optimizer, request).await
        }
    }
}

async fn run_optimize<P: PriceHistoryProvider>(
    optimizer: &PortfolioOptimizer<P>,
    request: OptimizeRequest,
) -> CliResult<()> {
    let tickers = TickerSet::new(&request.tickers)?;

    let pb = spinner(&format!("Optimizing {} ({})", tickers, request.kind));
    let result = optimizer
        .optimize_portfolio(&tickers, request.risk_free_rate, request.kind)
        .await;
    pb.finish_and_clear();

    let result = result?;
    emit(&result, request.format, request.output.as_deref())
}

fn emit(result: &OptimizationResult, format: OutputFormat, output: Option<&Path>) -> CliResult<()> {
    let export_format = match format {
        OutputFormat::Json => Some(ExportFormat::Json),
        OutputFormat::Pretty => Some(ExportFormat::PrettyJson),
        OutputFormat::Csv => Some(ExportFormat::Csv),
        OutputFormat::Text => None,
    };

    match (export_format, output) {
        (Some(format), Some(path)) => {
            result.export_to_file(path, format)?;
            info!(path = %path.display(), "wrote result");
        }
        (Some(format), None) => {
            let content = result.export_to_string(format)?;
            println!("{}", content.trim_end());
        }
        (None, Some(path)) => {
            std::fs::write(path, result.to_ascii_table())?;
            info!(path = %path.display(), "wrote result");
        }
        (None, None) => println!("{result}"),
    }

    Ok(())
}

pub(crate) async fn stats(
    config: EngineConfig,
    prices: Option<PathBuf>,
    tickers: Vec<String>,
) -> CliResult<()> {
    match prices {
        Some(path) => {
            let optimizer = PortfolioOptimizer::with_config(CsvPriceProvider::new(path), config)?;
            run_stats(&optimizer, &tickers).await
        }
        None => {
            let optimizer = PortfolioOptimizer::with_config(yahoo_provider(&config)?, config)?;
            run_stats(&optimizer, &tickers).await
        }
    }
}

async fn run_stats<P: PriceHistoryProvider>(
    optimizer: &PortfolioOptimizer<P>,
    tickers: &[String],
) -> CliResult<()> {
    let tickers = TickerSet::new(tickers)?;

    let pb = spinner(&format!("Fetching {tickers}"));
    let stats = optimizer.fetch_statistics(&tickers).await;
    pb.finish_and_clear();
    let stats = stats?;

    println!(
        "{}",
        render_statistics(
            tickers.as_slice(),
            stats.mean(),
            stats.covariance(),
            optimizer.config().periods_per_year,
        )
    );
    println!("Periods: {}", stats.n_periods());

    Ok(())
}
