use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::indicators::support::exponential_moving_average;
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;

/// Exponential moving average, seeded with the SMA over the first `period`
/// samples then recursed with `alpha = 2/(period+1)` (§4.3).
pub struct Ema {
    pub timeframe: Timeframe,
    pub property: CandleProperty,
    pub period: usize,
}

impl Ema {
    pub fn new(timeframe: Timeframe, property: CandleProperty, period: usize) -> Self {
        Self {
            timeframe,
            property,
            period,
        }
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> Vec<Option<Decimal>> {
        let values = buffer.values(self.timeframe, self.property, usize::MAX);
        exponential_moving_average(&values, self.period)
    }
}

impl Indicator for Ema {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        vec![IndicatorRequirement::new(self.timeframe, self.property, self.period)]
    }
}
