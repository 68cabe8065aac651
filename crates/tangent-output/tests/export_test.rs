//! Integration tests for result export.

use rstest::{fixture, rstest};
use std::fs;
use tangent_output::{
    ExportFormat, Exporter, OptimizationResponse, OptimizationResult, read_weights_csv,
};
use tangent_risk::{RatioKind, SolverStatus};

#[fixture]
fn result() -> OptimizationResult {
    OptimizationResult {
        tickers: vec!["VTI".to_string(), "BND".to_string(), "GLD".to_string()],
        weights: vec![0.5512, 0.3021, 0.1467],
        annualized_return: 0.0734,
        annualized_risk: 0.0921,
        ratio: 0.797,
        ratio_kind: RatioKind::Sharpe,
        status: SolverStatus::Converged,
    }
}

#[rstest]
fn test_json_file_round_trip(result: OptimizationResult) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir
        .path()
        .join(format!("weights.{}", ExportFormat::PrettyJson.extension()));

    result
        .export_to_file(&path, ExportFormat::PrettyJson)
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let parsed: OptimizationResponse = serde_json::from_str(&content).unwrap();

    assert_eq!(parsed, OptimizationResponse::from(&result));
    assert_eq!(parsed.yearly_returns, 7.34);
    assert_eq!(parsed.yearly_volatility, 9.21);
}

#[rstest]
fn test_csv_file_round_trip(result: OptimizationResult) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.csv");

    result.export_to_file(&path, ExportFormat::Csv).unwrap();

    let records = read_weights_csv(fs::File::open(&path).unwrap()).unwrap();
    let total: f64 = records.iter().map(|r| r.weight).sum();

    assert_eq!(records.len(), result.tickers.len());
    for (record, (ticker, weight)) in records.iter().zip(result.allocations()) {
        assert_eq!(record.ticker, ticker);
        assert_eq!(record.weight, weight);
    }
    assert!((total - 1.0).abs() < 1e-4);
}

#[rstest]
fn test_export_to_missing_directory_fails(result: OptimizationResult) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("weights.json");

    let err = result.export_to_file(&path, ExportFormat::Json).unwrap_err();
    assert!(matches!(err, tangent_output::ExportError::Io(_)));
}
