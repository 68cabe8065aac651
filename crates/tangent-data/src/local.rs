//! Price history read from local CSV files.
//!
//! The expected layout is wide: a `date` column (`YYYY-MM-DD`) followed by
//! one column of adjusted closes per ticker. Empty cells are missing values.
//!
//! ```text
//! date,AAPL,MSFT
//! 2024-01-02,185.64,370.87
//! 2024-01-03,184.25,
//! ```

use crate::error::{DataError, Result};
use crate::prices::{PriceTable, quote_frame};
use crate::provider::PriceHistoryProvider;
use crate::ticker::TickerSet;
use chrono::NaiveDate;
use polars::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a wide price CSV into a long-format quote frame.
///
/// Header names are normalized the same way as [`TickerSet`] identifiers.
///
/// # Returns
/// A DataFrame with columns: symbol, date, adjusted_close
pub fn read_wide_csv<R: Read>(reader: R) -> Result<DataFrame> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => {
            return Err(DataError::Parse(
                "first CSV column must be 'date'".to_string(),
            ));
        }
    }
    let symbols: Vec<String> = columns.map(|h| h.to_uppercase()).collect();
    if symbols.is_empty() {
        return Err(DataError::Parse("CSV has no ticker columns".to_string()));
    }

    let mut series: Vec<Vec<(NaiveDate, Option<f64>)>> = vec![Vec::new(); symbols.len()];

    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
            DataError::Parse(format!("row {}: bad date '{raw_date}': {e}", line + 1))
        })?;

        for (j, rows) in series.iter_mut().enumerate() {
            let price = match record.get(j + 1) {
                None | Some("") => None,
                Some(cell) => Some(cell.parse::<f64>().map_err(|e| {
                    DataError::Parse(format!("row {}: bad price '{cell}': {e}", line + 1))
                })?),
            };
            rows.push((date, price));
        }
    }

    let frames = symbols
        .iter()
        .zip(&series)
        .map(|(symbol, rows)| quote_frame(symbol, rows).map(|df| df.lazy()))
        .collect::<Result<Vec<_>>>()?;

    Ok(concat(frames, UnionArgs::default())?.collect()?)
}

/// Provider reading a wide CSV file on every fetch.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    path: PathBuf,
}

impl CsvPriceProvider {
    /// Create a provider for the CSV file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceHistoryProvider for CsvPriceProvider {
    async fn fetch_prices(&self, tickers: &TickerSet) -> Result<PriceTable> {
        let file = std::fs::File::open(&self.path)?;
        let quotes = read_wide_csv(file)?;
        let table = PriceTable::from_quotes(&quotes, tickers)?;

        info!(
            path = %self.path.display(),
            rows = table.n_rows(),
            assets = table.n_assets(),
            "loaded price history from CSV"
        );

        Ok(table)
    }
}
