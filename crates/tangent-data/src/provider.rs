//! The price history boundary.

use crate::error::Result;
use crate::prices::{PriceTable, quote_frame};
use crate::ticker::TickerSet;
use chrono::NaiveDate;
use polars::prelude::*;
use std::future::Future;

/// Source of aligned daily adjusted-close history.
///
/// Implementations must return a [`PriceTable`] whose columns follow the
/// order of `tickers`. Tickers without usable history are left out of the
/// table rather than failing the fetch; transport failures are errors.
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch and align price history for `tickers`.
    fn fetch_prices(&self, tickers: &TickerSet) -> impl Future<Output = Result<PriceTable>> + Send;
}

/// Provider serving quotes held in memory.
///
/// Useful for tests and for callers that already hold price history.
#[derive(Debug, Clone)]
pub struct StaticPriceProvider {
    quotes: DataFrame,
}

impl StaticPriceProvider {
    /// Wrap a long-format quote frame (symbol, date, adjusted_close).
    pub const fn new(quotes: DataFrame) -> Self {
        Self { quotes }
    }

    /// Build a provider from per-symbol price series.
    pub fn from_series<'a, I>(series: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Vec<(NaiveDate, Option<f64>)>)>,
    {
        let frames = series
            .into_iter()
            .map(|(symbol, rows)| quote_frame(symbol, &rows).map(|df| df.lazy()))
            .collect::<Result<Vec<_>>>()?;

        let quotes = if frames.is_empty() {
            quote_frame("", &[])?
        } else {
            concat(frames, UnionArgs::default())?.collect()?
        };

        Ok(Self::new(quotes))
    }

    /// Underlying quotes.
    pub const fn quotes(&self) -> &DataFrame {
        &self.quotes
    }
}

impl PriceHistoryProvider for StaticPriceProvider {
    async fn fetch_prices(&self, tickers: &TickerSet) -> Result<PriceTable> {
        PriceTable::from_quotes(&self.quotes, tickers)
    }
}
