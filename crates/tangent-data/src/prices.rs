//! Date-aligned price tables.
//!
//! Providers emit long-format quote frames with columns
//! `symbol`, `date`, `adjusted_close`. [`PriceTable::from_quotes`] pivots those
//! frames into a dense table: one column per ticker, one row per trading date
//! present for every ticker. Dates missing for any ticker are dropped for all.

use crate::error::{DataError, Result};
use crate::ticker::TickerSet;
use chrono::{Duration, NaiveDate};
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use tracing::{debug, warn};

/// Treat non-finite and non-positive prices as missing.
fn usable_price(price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0).then_some(price)
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

fn date_from_days(days: i32) -> Result<NaiveDate> {
    NaiveDate::default()
        .checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| DataError::TimeConversion(format!("day offset {days} out of range")))
}

/// Build a long-format quote frame for a single symbol.
///
/// Prices that are missing, non-finite or non-positive are stored as nulls so
/// that alignment drops their dates.
///
/// # Returns
/// A DataFrame with columns: symbol, date, adjusted_close
pub fn quote_frame(symbol: &str, rows: &[(NaiveDate, Option<f64>)]) -> Result<DataFrame> {
    let dates: Vec<i32> = rows.iter().map(|(d, _)| days_since_epoch(*d)).collect();
    let closes: Vec<Option<f64>> = rows
        .iter()
        .map(|(_, price)| price.and_then(usable_price))
        .collect();

    let dropped = closes.iter().filter(|c| c.is_none()).count();
    if dropped > 0 {
        debug!(symbol, dropped, "quote rows without a usable adjusted close");
    }

    let df = DataFrame::new(vec![
        Series::new("symbol".into(), vec![symbol; rows.len()]).into(),
        Series::new("date".into(), dates)
            .cast(&DataType::Date)?
            .into(),
        Series::new("adjusted_close".into(), closes).into(),
    ])?;

    Ok(df)
}

/// Dense table of adjusted closes.
///
/// Rows are trading dates in ascending order, columns are tickers. Every
/// entry is a finite, strictly positive price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    prices: Array2<f64>,
}

impl PriceTable {
    /// Create a price table from already aligned data.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidTable`] if the shape disagrees with the
    /// number of dates or tickers, dates are not strictly ascending, or a
    /// price is not finite and positive.
    pub fn new(dates: Vec<NaiveDate>, tickers: Vec<String>, prices: Array2<f64>) -> Result<Self> {
        let (n_rows, n_cols) = prices.dim();

        if n_rows != dates.len() || n_cols != tickers.len() {
            return Err(DataError::InvalidTable(format!(
                "shape {n_rows}x{n_cols} does not match {} dates and {} tickers",
                dates.len(),
                tickers.len()
            )));
        }

        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DataError::InvalidTable(
                "dates must be strictly ascending".to_string(),
            ));
        }

        if prices.iter().any(|&p| usable_price(p).is_none()) {
            return Err(DataError::InvalidTable(
                "prices must be finite and positive".to_string(),
            ));
        }

        Ok(Self {
            dates,
            tickers,
            prices,
        })
    }

    /// Pivot long-format quotes into an aligned table for `tickers`.
    ///
    /// Tickers with no usable rows are omitted from the table (and logged), so
    /// callers can detect them by comparing [`PriceTable::n_assets`] with the
    /// requested set. Column order follows `tickers`.
    ///
    /// # Arguments
    /// * `quotes` - DataFrame with columns: symbol, date, adjusted_close
    /// * `tickers` - Requested tickers, defining column order
    pub fn from_quotes(quotes: &DataFrame, tickers: &TickerSet) -> Result<Self> {
        let mut aligned: Option<LazyFrame> = None;
        let mut present: Vec<String> = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            let series = quotes
                .clone()
                .lazy()
                .filter(col("symbol").eq(lit(ticker.as_str())))
                .select([col("date"), col("adjusted_close").alias(ticker.as_str())])
                .drop_nulls(None)
                .collect()?;

            if series.height() == 0 {
                warn!(ticker = %ticker, "no usable price history, omitting from table");
                continue;
            }

            present.push(ticker.clone());
            aligned = Some(match aligned {
                None => series.lazy(),
                Some(frame) => frame.join(
                    series.lazy(),
                    [col("date")],
                    [col("date")],
                    JoinArgs::new(JoinType::Inner),
                ),
            });
        }

        let Some(aligned) = aligned else {
            return Ok(Self {
                dates: Vec::new(),
                tickers: present,
                prices: Array2::zeros((0, 0)),
            });
        };

        let df = aligned
            .with_column(col("date").cast(DataType::Int32))
            .sort(["date"], Default::default())
            .collect()?;

        let n_rows = df.height();
        let mut dates = Vec::with_capacity(n_rows);
        for day in df.column("date")?.i32()?.into_iter() {
            let day = day.ok_or_else(|| DataError::Parse("Missing date".to_string()))?;
            dates.push(date_from_days(day)?);
        }

        let mut prices = Array2::<f64>::zeros((n_rows, present.len()));
        for (j, ticker) in present.iter().enumerate() {
            let column = df.column(ticker.as_str())?.f64()?;
            for (i, price) in column.into_iter().enumerate() {
                prices[[i, j]] = price.ok_or_else(|| DataError::MissingData {
                    symbol: ticker.clone(),
                    reason: "null price after alignment".to_string(),
                })?;
            }
        }

        debug!(
            rows = n_rows,
            assets = present.len(),
            requested = tickers.len(),
            "aligned price table"
        );

        Self::new(dates, present, prices)
    }

    /// Trading dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Tickers present in the table, in column order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Price matrix (dates x tickers).
    pub const fn prices(&self) -> &Array2<f64> {
        &self.prices
    }

    /// Number of aligned trading dates.
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    /// Number of tickers with price history.
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Price column for a ticker.
    pub fn column(&self, ticker: &str) -> Option<ArrayView1<'_, f64>> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|j| self.prices.column(j))
    }
}
