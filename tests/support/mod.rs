//! Shared fixtures for the integration scenarios: a candle source over a
//! fixed in-memory sequence, and a strategy driven by a boxed closure so
//! each scenario can script its own order submissions without a new type.

use std::convert::Infallible;

use quantback::domain::broker::BrokerProxy;
use quantback::domain::indicators::IndicatorRequirement;
use quantback::domain::market::{AnalyserBuffer, Candle, CandlesView, Timeframe};
use quantback::domain::ports::{CandleSource, Strategy};

pub struct FixedSource {
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
}

impl CandleSource for FixedSource {
    type Error = Infallible;

    fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    fn symbol(&self) -> &str {
        "TEST"
    }

    fn title(&self) -> &str {
        "fixed-source"
    }

    fn create(&self, since: i64, until: i64) -> Box<dyn Iterator<Item = Result<Candle, Self::Error>>> {
        let window: Vec<_> = self
            .candles
            .iter()
            .filter(|c| c.open_time >= since && c.close_time < until)
            .copied()
            .map(Ok)
            .collect();
        Box::new(window.into_iter())
    }
}

/// One M1 bar per `(open, high, low, close)` tuple, laid out back-to-back
/// starting at `start`.
pub fn m1_candles(start: i64, bars: &[(i64, i64, i64, i64)]) -> Vec<Candle> {
    use rust_decimal::Decimal;
    let period = Timeframe::M1.period_ms();
    bars.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            let open_time = start + i as i64 * period;
            Candle::new(
                open_time,
                open_time + period - 1,
                Decimal::from(open),
                Decimal::from(high),
                Decimal::from(low),
                Decimal::from(close),
                Decimal::ONE,
            )
        })
        .collect()
}

/// A strategy whose `tick` is a boxed closure, so each scenario scripts its
/// own submissions without defining a new type per test.
pub struct ScriptedStrategy {
    pub title: &'static str,
    pub indicators: Vec<IndicatorRequirement>,
    pub on_tick: Box<dyn FnMut(&mut BrokerProxy<'_>, &AnalyserBuffer, CandlesView<'_>)>,
}

impl Strategy for ScriptedStrategy {
    fn title(&self) -> &str {
        self.title
    }

    fn candle_timeframes(&self) -> Vec<Timeframe> {
        vec![]
    }

    fn indicators(&self) -> Vec<IndicatorRequirement> {
        self.indicators.clone()
    }

    fn tick(&mut self, broker: &mut BrokerProxy<'_>, analyser: &AnalyserBuffer, candles: CandlesView<'_>) {
        (self.on_tick)(broker, analyser, candles);
    }
}
