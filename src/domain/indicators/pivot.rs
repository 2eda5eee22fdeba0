use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Traditional pivot points, `s1..s5`/`r1..r5` around the typical price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraditionalPivotPoint {
    pub pivot: Decimal,
    pub s1: Decimal,
    pub s2: Decimal,
    pub s3: Decimal,
    pub s4: Decimal,
    pub s5: Decimal,
    pub r1: Decimal,
    pub r2: Decimal,
    pub r3: Decimal,
    pub r4: Decimal,
    pub r5: Decimal,
}

/// Classic pivot points, `s1..s4`/`r1..r4` spaced by multiples of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassicPivotPoint {
    pub pivot: Decimal,
    pub s1: Decimal,
    pub s2: Decimal,
    pub s3: Decimal,
    pub s4: Decimal,
    pub r1: Decimal,
    pub r2: Decimal,
    pub r3: Decimal,
    pub r4: Decimal,
}

/// Fibonacci pivot points, `s1..s3`/`r1..r3` at 0.382/0.618/1.0 of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibonacciPivotPoint {
    pub pivot: Decimal,
    pub s1: Decimal,
    pub s2: Decimal,
    pub s3: Decimal,
    pub r1: Decimal,
    pub r2: Decimal,
    pub r3: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotPointsType {
    Traditional,
    Classic,
    Fibonacci,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PivotPointsResult {
    Traditional(Vec<TraditionalPivotPoint>),
    Classic(Vec<ClassicPivotPoint>),
    Fibonacci(Vec<FibonacciPivotPoint>),
}

/// Pivot points over `(high, low, close)` at a higher timeframe, read from
/// only the previous *completed* bar: the most recent (in-progress) bar is
/// dropped before computing, matching the original's `highs[:-1]` slice
/// (§4.3, default `p=15`).
pub struct PivotPoints {
    pub timeframe: Timeframe,
    pub period: usize,
    pub pivot_type: PivotPointsType,
}

impl PivotPoints {
    pub fn new(timeframe: Timeframe, period: usize, pivot_type: PivotPointsType) -> Self {
        Self {
            timeframe,
            period,
            pivot_type,
        }
    }

    pub fn default_params(timeframe: Timeframe) -> Self {
        Self::new(timeframe, 15, PivotPointsType::Traditional)
    }

    fn completed_bars(&self, buffer: &AnalyserBuffer) -> (Vec<Decimal>, Vec<Decimal>, Vec<Decimal>) {
        let quantity = self.period + 1;
        let mut highs = buffer.values(self.timeframe, CandleProperty::High, quantity);
        let mut lows = buffer.values(self.timeframe, CandleProperty::Low, quantity);
        let mut closes = buffer.values(self.timeframe, CandleProperty::Close, quantity);
        // Drop the most recent (still in-progress) bar.
        highs.pop();
        lows.pop();
        closes.pop();
        (highs, lows, closes)
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> PivotPointsResult {
        let (highs, lows, closes) = self.completed_bars(buffer);
        match self.pivot_type {
            PivotPointsType::Traditional => PivotPointsResult::Traditional(traditional(&highs, &lows, &closes)),
            PivotPointsType::Classic => PivotPointsResult::Classic(classic(&highs, &lows, &closes)),
            PivotPointsType::Fibonacci => PivotPointsResult::Fibonacci(fibonacci(&highs, &lows, &closes)),
        }
    }
}

fn typical_price(h: Decimal, l: Decimal, c: Decimal) -> Decimal {
    (h + l + c) / Decimal::from(3u64)
}

fn traditional(highs: &[Decimal], lows: &[Decimal], closes: &[Decimal]) -> Vec<TraditionalPivotPoint> {
    let mut out = Vec::with_capacity(highs.len());
    for i in 0..highs.len() {
        let (h, l, c) = (highs[i], lows[i], closes[i]);
        let pivot = typical_price(h, l, c);
        out.push(TraditionalPivotPoint {
            pivot,
            s1: pivot * dec!(2) - h,
            s2: pivot - (h - l),
            s3: l - dec!(2) * (h - pivot),
            s4: l - dec!(3) * (h - pivot),
            s5: l - dec!(4) * (h - pivot),
            r1: pivot * dec!(2) - l,
            r2: pivot + (h - l),
            r3: h + dec!(2) * (pivot - l),
            r4: h + dec!(3) * (pivot - l),
            r5: h + dec!(4) * (pivot - l),
        });
    }
    out
}

fn classic(highs: &[Decimal], lows: &[Decimal], closes: &[Decimal]) -> Vec<ClassicPivotPoint> {
    let mut out = Vec::with_capacity(highs.len());
    for i in 0..highs.len() {
        let (h, l, c) = (highs[i], lows[i], closes[i]);
        let pivot = typical_price(h, l, c);
        let range = h - l;
        out.push(ClassicPivotPoint {
            pivot,
            s1: pivot * dec!(2) - h,
            s2: pivot - range,
            s3: pivot - dec!(2) * range,
            s4: pivot - dec!(3) * range,
            r1: pivot * dec!(2) - l,
            r2: pivot + range,
            r3: pivot + dec!(2) * range,
            r4: pivot + dec!(3) * range,
        });
    }
    out
}

fn fibonacci(highs: &[Decimal], lows: &[Decimal], closes: &[Decimal]) -> Vec<FibonacciPivotPoint> {
    let mut out = Vec::with_capacity(highs.len());
    for i in 0..highs.len() {
        let (h, l, c) = (highs[i], lows[i], closes[i]);
        let pivot = typical_price(h, l, c);
        let range = h - l;
        out.push(FibonacciPivotPoint {
            pivot,
            s1: pivot - dec!(0.382) * range,
            s2: pivot - dec!(0.618) * range,
            s3: pivot - range,
            r1: pivot + dec!(0.382) * range,
            r2: pivot + dec!(0.618) * range,
            r3: pivot + range,
        });
    }
    out
}

impl Indicator for PivotPoints {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        let quantity = self.period + 1;
        vec![
            IndicatorRequirement::new(self.timeframe, CandleProperty::High, quantity),
            IndicatorRequirement::new(self.timeframe, CandleProperty::Low, quantity),
            IndicatorRequirement::new(self.timeframe, CandleProperty::Close, quantity),
        ]
    }
}
