use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::indicators::support::{rolling_stddev, simple_moving_average};
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;

/// One point of the Bollinger Bands series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BbandsPoint {
    pub upper: Option<Decimal>,
    pub middle: Option<Decimal>,
    pub lower: Option<Decimal>,
}

/// Bollinger Bands: an SMA middle band with upper/lower bands offset by
/// `k` population standard deviations (§4.3, default `p=20, k=2`).
pub struct Bbands {
    pub timeframe: Timeframe,
    pub property: CandleProperty,
    pub period: usize,
    pub k: Decimal,
}

impl Bbands {
    pub fn new(timeframe: Timeframe, property: CandleProperty, period: usize, k: Decimal) -> Self {
        Self {
            timeframe,
            property,
            period,
            k,
        }
    }

    pub fn default_params(timeframe: Timeframe, property: CandleProperty) -> Self {
        Self::new(timeframe, property, 20, Decimal::from(2u64))
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> Vec<BbandsPoint> {
        let values = buffer.values(self.timeframe, self.property, usize::MAX);
        let middle = simple_moving_average(&values, self.period);
        let stddev = rolling_stddev(&values, self.period);

        middle
            .into_iter()
            .zip(stddev)
            .map(|(mid, sd)| match (mid, sd) {
                (Some(mid), Some(sd)) => BbandsPoint {
                    upper: Some(mid + self.k * sd),
                    middle: Some(mid),
                    lower: Some(mid - self.k * sd),
                },
                _ => BbandsPoint { upper: None, middle: None, lower: None },
            })
            .collect()
    }
}

impl Indicator for Bbands {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        vec![IndicatorRequirement::new(self.timeframe, self.property, self.period)]
    }
}
