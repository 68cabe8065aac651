//! Export of optimization results.
//!
//! JSON output uses the [`OptimizationResponse`] contract; CSV output lists
//! one `ticker,weight` row per asset.

use crate::response::OptimizationResponse;
use crate::result::OptimizationResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated `ticker,weight` rows.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One CSV row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightRecord {
    /// Asset identifier.
    pub ticker: String,

    /// Portfolio weight.
    pub weight: f64,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for OptimizationResult {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for (ticker, weight) in self.allocations() {
                    wtr.serialize(WeightRecord {
                        ticker: ticker.to_string(),
                        weight,
                    })?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            ExportFormat::Json => Ok(OptimizationResponse::from(self).to_json()?),
            ExportFormat::PrettyJson => Ok(OptimizationResponse::from(self).to_json_pretty()?),
        }
    }
}

/// Parse `ticker,weight` rows written by the CSV export.
pub fn read_weights_csv<R: std::io::Read>(reader: R) -> Result<Vec<WeightRecord>, ExportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    Ok(rdr.deserialize().collect::<Result<Vec<WeightRecord>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tangent_risk::{RatioKind, SolverStatus};

    fn result() -> OptimizationResult {
        OptimizationResult {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string(), "TSLA".to_string()],
            weights: vec![0.5, 0.3, 0.2],
            annualized_return: 0.1,
            annualized_risk: 0.15,
            ratio: 0.6667,
            ratio_kind: RatioKind::Sharpe,
            status: SolverStatus::Converged,
        }
    }

    #[test]
    fn test_csv_export() {
        let csv = result().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("ticker,weight"));
        assert_eq!(lines.next(), Some("AAPL,0.5"));
        assert_eq!(lines.next(), Some("MSFT,0.3"));
        assert_eq!(lines.next(), Some("TSLA,0.2"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_json_export_uses_response_contract() {
        let json = result().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"Optimized weights\":[0.5,0.3,0.2]"));
        assert!(json.contains("\"Yearly returns\":10.0"));
        assert!(!json.contains("AAPL"));
    }

    #[test]
    fn test_pretty_json_export() {
        let json = result().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("  \"Sharpe ratio\": 0.6667"));
    }

    #[test]
    fn test_csv_read_back() {
        let csv = result().export_to_string(ExportFormat::Csv).unwrap();
        let records = read_weights_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[2].ticker, "TSLA");
        assert_eq!(records[2].weight, 0.2);
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
