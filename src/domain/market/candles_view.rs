//! Read-only window over the base-timeframe candles seen so far (§6.2),
//! handed to a strategy alongside the analyser buffer for callers that need
//! raw OHLCV history rather than an aggregated indicator series.

use crate::domain::market::Candle;

#[derive(Debug, Clone, Copy)]
pub struct CandlesView<'a> {
    candles: &'a [Candle],
}

impl<'a> CandlesView<'a> {
    pub fn new(candles: &'a [Candle]) -> Self {
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// The most recently closed base candle, if any have arrived yet.
    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The `n`-th most recent candle (0 = latest), if the window is deep enough.
    pub fn nth_from_latest(&self, n: usize) -> Option<&Candle> {
        self.candles.len().checked_sub(n + 1).map(|idx| &self.candles[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }
}
