use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::indicators::support::simple_moving_average;
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;

/// Simple moving average over `period` samples of `property` at `timeframe`
/// (§4.3). `sma[i] = mean(x[i-p+1..=i])`, `None` for `i < p - 1`.
pub struct Sma {
    pub timeframe: Timeframe,
    pub property: CandleProperty,
    pub period: usize,
}

impl Sma {
    pub fn new(timeframe: Timeframe, property: CandleProperty, period: usize) -> Self {
        Self {
            timeframe,
            property,
            period,
        }
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> Vec<Option<Decimal>> {
        let values = buffer.values(self.timeframe, self.property, usize::MAX);
        simple_moving_average(&values, self.period)
    }
}

impl Indicator for Sma {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        vec![IndicatorRequirement::new(self.timeframe, self.property, self.period)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::Candle;
    use rust_decimal_macros::dec;

    #[test]
    fn sma_aligns_with_buffer_and_warms_up() {
        let mut buffer = AnalyserBuffer::new(0);
        let sma = Sma::new(Timeframe::M1, CandleProperty::Close, 3);
        buffer.reserve(sma.timeframe, sma.property, sma.period);

        let m1 = Timeframe::M1.period_ms();
        for (i, close) in [1, 2, 3, 4, 5].into_iter().enumerate() {
            buffer.update(&Candle::new(
                i as i64 * m1,
                i as i64 * m1 + m1 - 1,
                Decimal::from(close),
                Decimal::from(close),
                Decimal::from(close),
                Decimal::from(close),
                dec!(1),
            ));
        }

        let out = sma.compute(&buffer);
        assert_eq!(out, vec![None, None, Some(dec!(2)), Some(dec!(3)), Some(dec!(4))]);
    }
}
