#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tangent-finance/tangent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod local;
pub mod prices;
pub mod provider;
pub mod ticker;
pub mod yahoo;

pub use error::{DataError, Result};
pub use local::CsvPriceProvider;
pub use prices::{PriceTable, quote_frame};
pub use provider::{PriceHistoryProvider, StaticPriceProvider};
pub use ticker::TickerSet;
pub use yahoo::YahooPriceProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
