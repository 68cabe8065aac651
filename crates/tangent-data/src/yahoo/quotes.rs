//! Adjusted-close history from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::prices::{PriceTable, quote_frame};
use crate::provider::PriceHistoryProvider;
use crate::ticker::TickerSet;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use yahoo_finance_api as yahoo;

/// Yahoo Finance price provider with rate limiting.
pub struct YahooPriceProvider {
    provider: yahoo::YahooConnector,
    history_start: NaiveDate,
    rate_limit_delay: Duration,
    concurrency: usize,
}

impl std::fmt::Debug for YahooPriceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooPriceProvider")
            .field("history_start", &self.history_start)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl YahooPriceProvider {
    /// Earliest date requested by default. Yahoo clips to each listing date.
    pub const DEFAULT_HISTORY_START: (i32, u32, u32) = (1980, 1, 1);

    /// Create a provider fetching full history, one request at a time.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP connector cannot be built.
    pub fn new() -> Result<Self> {
        let (y, m, d) = Self::DEFAULT_HISTORY_START;
        let history_start = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| DataError::TimeConversion("invalid default start".to_string()))?;

        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            history_start,
            rate_limit_delay: Duration::from_millis(250),
            concurrency: 1,
        })
    }

    /// Set the first date of the requested history.
    pub const fn with_history_start(mut self, start: NaiveDate) -> Self {
        self.history_start = start;
        self
    }

    /// Set the pause after each request.
    pub const fn with_rate_limit(mut self, rate_limit_delay: Duration) -> Self {
        self.rate_limit_delay = rate_limit_delay;
        self
    }

    /// Set how many symbols are fetched concurrently (at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch daily adjusted closes for a single symbol.
    ///
    /// Quotes whose adjusted close is missing, non-finite or non-positive are
    /// kept as nulls and dropped later during alignment.
    ///
    /// # Returns
    /// A Polars DataFrame with columns: symbol, date, adjusted_close
    pub async fn fetch_adjusted_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let mut rows = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            let date = i64::try_from(quote.timestamp)
                .ok()
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::TimeConversion(format!("bad quote timestamp for {symbol}"))
                })?;
            rows.push((date, Some(quote.adjclose)));
        }

        let df = quote_frame(symbol, &rows)?;

        sleep(self.rate_limit_delay).await;

        Ok(df)
    }

    /// Fetch adjusted closes for every ticker and stack them.
    ///
    /// A symbol for which Yahoo returns no quotes is logged and skipped; any
    /// other failure aborts the batch.
    pub async fn fetch_quotes_batch(
        &self,
        tickers: &TickerSet,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        let results: Vec<(String, Result<DataFrame>)> = stream::iter(tickers.iter().cloned())
            .map(|symbol: String| async move {
                let result = self.fetch_adjusted_closes(&symbol, start, end).await;
                (symbol, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut frames = Vec::with_capacity(results.len());
        for (symbol, result) in results {
            match result {
                Ok(df) if df.height() > 0 => frames.push(df.lazy()),
                Ok(_) => warn!(symbol = %symbol, "no quotes returned"),
                Err(DataError::MissingData { reason, .. }) => {
                    warn!(symbol = %symbol, %reason, "skipping symbol");
                }
                Err(e) => return Err(e),
            }
        }

        if frames.is_empty() {
            return Err(DataError::MissingData {
                symbol: tickers.to_string(),
                reason: "No data fetched for any symbol".to_string(),
            });
        }

        Ok(concat(frames, UnionArgs::default())?.collect()?)
    }
}

impl PriceHistoryProvider for YahooPriceProvider {
    async fn fetch_prices(&self, tickers: &TickerSet) -> Result<PriceTable> {
        let start = self
            .history_start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| DataError::TimeConversion("invalid history start".to_string()))?;
        let end = Utc::now();

        let quotes = self.fetch_quotes_batch(tickers, start, end).await?;
        let table = PriceTable::from_quotes(&quotes, tickers)?;

        info!(
            tickers = %tickers,
            rows = table.n_rows(),
            assets = table.n_assets(),
            "fetched price history from Yahoo Finance"
        );

        Ok(table)
    }
}
