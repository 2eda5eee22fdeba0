use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::indicators::support::exponential_moving_average;
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;

/// One point of the MACD series: the MACD line, its signal line, and their
/// difference (the histogram).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: Option<Decimal>,
    pub signal: Option<Decimal>,
    pub hist: Option<Decimal>,
}

pub struct MacdResultSequence {
    pub points: Vec<MacdPoint>,
}

impl MacdResultSequence {
    /// Sign change of `hist` between the last two points (§4.3).
    pub fn crossover_up(&self) -> bool {
        let n = self.points.len();
        if n < 2 {
            return false;
        }
        matches!(
            (self.points[n - 2].hist, self.points[n - 1].hist),
            (Some(prev), Some(last)) if prev <= Decimal::ZERO && last > Decimal::ZERO
        )
    }

    pub fn crossover_down(&self) -> bool {
        let n = self.points.len();
        if n < 2 {
            return false;
        }
        matches!(
            (self.points[n - 2].hist, self.points[n - 1].hist),
            (Some(prev), Some(last)) if prev > Decimal::ZERO && last <= Decimal::ZERO
        )
    }
}

/// `MACD(tf, fast=12, slow=26, signal=9)`: `EMA(fast) - EMA(slow)`; the
/// signal line is the EMA of the MACD line itself (§4.3).
pub struct Macd {
    pub timeframe: Timeframe,
    pub property: CandleProperty,
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Macd {
    pub fn new(timeframe: Timeframe, property: CandleProperty, fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            timeframe,
            property,
            fast,
            slow,
            signal,
        }
    }

    pub fn default_periods(timeframe: Timeframe, property: CandleProperty) -> Self {
        Self::new(timeframe, property, 12, 26, 9)
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> MacdResultSequence {
        let values = buffer.values(self.timeframe, self.property, usize::MAX);
        let ema_fast = exponential_moving_average(&values, self.fast);
        let ema_slow = exponential_moving_average(&values, self.slow);

        let macd_line: Vec<Option<Decimal>> = ema_fast
            .iter()
            .zip(ema_slow.iter())
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(*f - *s),
                _ => None,
            })
            .collect();

        // Run the signal EMA over the contiguous defined suffix of the
        // MACD line, then map the result back onto the full-length index.
        let first_defined = macd_line.iter().position(Option::is_some);
        let mut signal_line = vec![None; macd_line.len()];
        if let Some(start) = first_defined {
            let defined: Vec<Decimal> = macd_line[start..].iter().map(|v| v.unwrap()).collect();
            let signal_over_defined = exponential_moving_average(&defined, self.signal);
            for (offset, value) in signal_over_defined.into_iter().enumerate() {
                signal_line[start + offset] = value;
            }
        }

        let points = macd_line
            .into_iter()
            .zip(signal_line)
            .map(|(macd, signal)| MacdPoint {
                macd,
                signal,
                hist: match (macd, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                },
            })
            .collect();

        MacdResultSequence { points }
    }
}

impl Indicator for Macd {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        vec![IndicatorRequirement::new(
            self.timeframe,
            self.property,
            self.slow + self.signal,
        )]
    }
}
