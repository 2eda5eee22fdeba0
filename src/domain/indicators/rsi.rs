use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::indicators::support::wilder_average;
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;

/// Wilder-smoothed RSI over closes at `timeframe` (§4.3, default `p=14`).
pub struct Rsi {
    pub timeframe: Timeframe,
    pub period: usize,
}

impl Rsi {
    pub fn new(timeframe: Timeframe, period: usize) -> Self {
        Self { timeframe, period }
    }

    pub fn default_period(timeframe: Timeframe) -> Self {
        Self::new(timeframe, 14)
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> Vec<Option<Decimal>> {
        let closes = buffer.values(self.timeframe, CandleProperty::Close, usize::MAX);
        if closes.len() < 2 {
            return vec![None; closes.len()];
        }

        let mut gains = Vec::with_capacity(closes.len() - 1);
        let mut losses = Vec::with_capacity(closes.len() - 1);
        for window in closes.windows(2) {
            let diff = window[1] - window[0];
            gains.push(diff.max(Decimal::ZERO));
            losses.push((-diff).max(Decimal::ZERO));
        }

        let avg_gain = wilder_average(&gains, self.period);
        let avg_loss = wilder_average(&losses, self.period);

        let mut out = vec![None; closes.len()];
        for i in 0..gains.len() {
            if let (Some(gain), Some(loss)) = (avg_gain[i], avg_loss[i]) {
                let rsi = if loss == Decimal::ZERO {
                    Decimal::from(100)
                } else {
                    let rs = gain / loss;
                    Decimal::from(100) - Decimal::from(100) / (Decimal::ONE + rs)
                };
                // diffs[i] is the step from closes[i] to closes[i+1].
                out[i + 1] = Some(rsi);
            }
        }
        out
    }
}

impl Indicator for Rsi {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        vec![IndicatorRequirement::new(
            self.timeframe,
            CandleProperty::Close,
            self.period + 1,
        )]
    }
}
