//! Tangent CLI binary.
//!
//! Optimizes a portfolio of tickers for the Sharpe or Sortino ratio and
//! prints the allocation. Logs go to stderr so stdout stays machine-readable.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tangent::RatioKind;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tangent")]
#[command(about = "Tangent: risk-adjusted portfolio optimization", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/tangent/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the weights maximizing a risk-adjusted ratio
    Optimize {
        /// Ticker symbols, e.g. AAPL MSFT TLT
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Ratio to maximize
        #[arg(long, value_enum, default_value_t = Ratio::Sharpe)]
        ratio: Ratio,

        /// Annual risk-free rate (overrides the configuration)
        #[arg(long)]
        risk_free_rate: Option<f64>,

        /// Wide CSV of adjusted closes instead of Yahoo Finance
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write the result to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show mean returns and covariance of the tickers
    Stats {
        /// Ticker symbols
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Wide CSV of adjusted closes instead of Yahoo Finance
        #[arg(long)]
        prices: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Ratio {
    Sharpe,
    Sortino,
}

impl From<Ratio> for RatioKind {
    fn from(ratio: Ratio) -> Self {
        match ratio {
            Ratio::Sharpe => Self::Sharpe,
            Ratio::Sortino => Self::Sortino,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Compact JSON response
    Json,
    /// Indented JSON response
    Pretty,
    /// ticker,weight rows
    Csv,
    /// Human-readable table
    Text,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Optimize {
            tickers,
            ratio,
            risk_free_rate,
            prices,
            format,
            output,
        } => {
            let request = commands::OptimizeRequest {
                tickers,
                kind: ratio.into(),
                risk_free_rate: risk_free_rate.unwrap_or(config.risk_free_rate),
                format,
                output,
            };
            commands::optimize(config, prices, request).await?;
        }
        Commands::Stats { tickers, prices } => {
            commands::stats(config, prices, tickers).await?;
        }
    }

    Ok(())
}
