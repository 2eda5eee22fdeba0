use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::indicators::support::wilder_average;
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;

/// Wilder-smoothed Average True Range (§4.3, default `p=14`).
pub struct Atr {
    pub timeframe: Timeframe,
    pub period: usize,
}

impl Atr {
    pub fn new(timeframe: Timeframe, period: usize) -> Self {
        Self { timeframe, period }
    }

    pub fn default_period(timeframe: Timeframe) -> Self {
        Self::new(timeframe, 14)
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> Vec<Option<Decimal>> {
        let highs = buffer.values(self.timeframe, CandleProperty::High, usize::MAX);
        let lows = buffer.values(self.timeframe, CandleProperty::Low, usize::MAX);
        let closes = buffer.values(self.timeframe, CandleProperty::Close, usize::MAX);
        let true_ranges = true_range(&highs, &lows, &closes);
        wilder_average(&true_ranges, self.period)
    }
}

/// True range per bar: `max(high-low, |high-prev_close|, |low-prev_close|)`,
/// falling back to `high-low` for the first bar (no previous close).
pub fn true_range(highs: &[Decimal], lows: &[Decimal], closes: &[Decimal]) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(highs.len());
    for i in 0..highs.len() {
        if i == 0 {
            out.push(highs[i] - lows[i]);
        } else {
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            out.push(hl.max(hc).max(lc));
        }
    }
    out
}

impl Indicator for Atr {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        vec![
            IndicatorRequirement::new(self.timeframe, CandleProperty::High, self.period + 1),
            IndicatorRequirement::new(self.timeframe, CandleProperty::Low, self.period + 1),
            IndicatorRequirement::new(self.timeframe, CandleProperty::Close, self.period + 1),
        ]
    }
}
