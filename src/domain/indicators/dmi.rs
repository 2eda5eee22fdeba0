use crate::domain::indicators::atr::true_range;
use crate::domain::indicators::params::{Indicator, IndicatorRequirement};
use crate::domain::indicators::support::wilder_average;
use crate::domain::market::{AnalyserBuffer, CandleProperty, Timeframe};
use rust_decimal::Decimal;

/// One point of the Directional Movement series: `+DI`, `-DI`, and `ADX`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmiPoint {
    pub plus_di: Option<Decimal>,
    pub minus_di: Option<Decimal>,
    pub adx: Option<Decimal>,
}

pub struct DmiResultSequence {
    pub points: Vec<DmiPoint>,
}

impl DmiResultSequence {
    fn adx_tail(&self, period: usize) -> Option<Vec<Decimal>> {
        if self.points.len() < period {
            return None;
        }
        let tail: Option<Vec<Decimal>> = self.points[self.points.len() - period..]
            .iter()
            .map(|p| p.adx)
            .collect();
        tail
    }

    /// `true` if ADX strictly increased across every step of the last
    /// `period` points.
    pub fn adx_increases(&self, period: usize) -> bool {
        match self.adx_tail(period) {
            Some(tail) => tail.windows(2).all(|w| w[1] > w[0]),
            None => false,
        }
    }

    /// `true` if ADX strictly decreased across every step of the last
    /// `period` points.
    pub fn adx_decreases(&self, period: usize) -> bool {
        match self.adx_tail(period) {
            Some(tail) => tail.windows(2).all(|w| w[1] < w[0]),
            None => false,
        }
    }
}

/// Wilder's Directional Movement Index: `+DI`/`-DI` from smoothed directional
/// movement over smoothed true range, `ADX` as the Wilder average of `DX =
/// 100 * |+DI - -DI| / (+DI + -DI)` (§4.3, default `p=14`).
pub struct Dmi {
    pub timeframe: Timeframe,
    pub period: usize,
}

impl Dmi {
    pub fn new(timeframe: Timeframe, period: usize) -> Self {
        Self { timeframe, period }
    }

    pub fn default_period(timeframe: Timeframe) -> Self {
        Self::new(timeframe, 14)
    }

    pub fn compute(&self, buffer: &AnalyserBuffer) -> DmiResultSequence {
        let highs = buffer.values(self.timeframe, CandleProperty::High, usize::MAX);
        let lows = buffer.values(self.timeframe, CandleProperty::Low, usize::MAX);
        let closes = buffer.values(self.timeframe, CandleProperty::Close, usize::MAX);

        if highs.len() < 2 {
            return DmiResultSequence { points: vec![] };
        }

        let true_ranges = true_range(&highs, &lows, &closes);
        let mut plus_dm = Vec::with_capacity(highs.len() - 1);
        let mut minus_dm = Vec::with_capacity(highs.len() - 1);
        for i in 1..highs.len() {
            let up_move = highs[i] - highs[i - 1];
            let down_move = lows[i - 1] - lows[i];
            if up_move > down_move && up_move > Decimal::ZERO {
                plus_dm.push(up_move);
            } else {
                plus_dm.push(Decimal::ZERO);
            }
            if down_move > up_move && down_move > Decimal::ZERO {
                minus_dm.push(down_move);
            } else {
                minus_dm.push(Decimal::ZERO);
            }
        }

        // true_ranges[0] has no previous close, pair it against dm from
        // index 1 onward so everything aligns on the same diff index.
        let tr_tail = &true_ranges[1..];
        let smoothed_tr = wilder_average(tr_tail, self.period);
        let smoothed_plus_dm = wilder_average(&plus_dm, self.period);
        let smoothed_minus_dm = wilder_average(&minus_dm, self.period);

        let mut points = vec![DmiPoint { plus_di: None, minus_di: None, adx: None }; highs.len()];
        let mut dx_series: Vec<Option<Decimal>> = vec![None; smoothed_tr.len()];

        for i in 0..smoothed_tr.len() {
            if let (Some(tr), Some(pdm), Some(mdm)) = (smoothed_tr[i], smoothed_plus_dm[i], smoothed_minus_dm[i]) {
                if tr == Decimal::ZERO {
                    continue;
                }
                let plus_di = Decimal::from(100) * pdm / tr;
                let minus_di = Decimal::from(100) * mdm / tr;
                points[i + 1].plus_di = Some(plus_di);
                points[i + 1].minus_di = Some(minus_di);
                let sum = plus_di + minus_di;
                if sum != Decimal::ZERO {
                    dx_series[i] = Some(Decimal::from(100) * (plus_di - minus_di).abs() / sum);
                } else {
                    dx_series[i] = Some(Decimal::ZERO);
                }
            }
        }

        let dx_first_defined = dx_series.iter().position(Option::is_some);
        if let Some(start) = dx_first_defined {
            let dx_defined: Vec<Decimal> = dx_series[start..].iter().map(|v| v.unwrap()).collect();
            let adx_over_defined = wilder_average(&dx_defined, self.period);
            for (offset, value) in adx_over_defined.into_iter().enumerate() {
                // dx_series index i feeds points[i + 1].
                points[start + offset + 1].adx = value;
            }
        }

        DmiResultSequence { points }
    }
}

impl Indicator for Dmi {
    fn requirements(&self) -> Vec<IndicatorRequirement> {
        vec![
            IndicatorRequirement::new(self.timeframe, CandleProperty::High, 2 * self.period + 2),
            IndicatorRequirement::new(self.timeframe, CandleProperty::Low, 2 * self.period + 2),
            IndicatorRequirement::new(self.timeframe, CandleProperty::Close, 2 * self.period + 2),
        ]
    }
}
