//! Market data access port trait.

use crate::domain::error::AlgoblocksError;
use crate::domain::market_series::Bar;
use crate::domain::settings::{Interval, Lookback};

pub trait MarketDataPort {
    /// Bars for `ticker` sampled at `interval` covering `lookback`, oldest
    /// first. An unknown ticker yields an empty vector rather than an error.
    fn fetch_bars(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Bar>, AlgoblocksError>;
}
