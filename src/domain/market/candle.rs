//! The OHLCV candle record (§3) and the invariant a well-formed bar must
//! satisfy relative to its timeframe.

use crate::domain::market::timeframe::Timeframe;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Timestamps are milliseconds since epoch, matching the
/// teacher's timestamp convention throughout `domain::market`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub close_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub is_closed: bool,
}

impl Candle {
    pub fn new(
        open_time: i64,
        close_time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            open_time,
            close_time,
            open,
            high,
            low,
            close,
            volume,
            is_closed: true,
        }
    }

    /// `low <= open,close <= high`, `low <= high`, `close_time > open_time`,
    /// and the bar spans exactly one window of `timeframe` (§3).
    pub fn is_well_formed(&self, timeframe: Timeframe) -> bool {
        self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
            && self.low <= self.high
            && self.close_time > self.open_time
            && self.close_time - self.open_time == timeframe.period_ms() - 1
    }
}
