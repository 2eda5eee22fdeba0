//! Multi-timeframe analyser buffer (§4.2): per-(timeframe, property) ring
//! buffers that aggregate a base-timeframe candle stream into higher
//! timeframe bars, grounded on the teacher's `TimeframeCandle::update`
//! high=max/low=min/close=latest/volume=sum fold, generalized here from a
//! single aggregation target to a map of timeframes each with its own
//! rolling `end_time`.

use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// A candle field a buffer can track independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleProperty {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl CandleProperty {
    fn initial_value(&self, candle: &Candle) -> Decimal {
        match self {
            CandleProperty::Open => candle.open,
            CandleProperty::High => candle.high,
            CandleProperty::Low => candle.low,
            CandleProperty::Close => candle.close,
            CandleProperty::Volume => candle.volume,
        }
    }
}

/// A fixed-capacity FIFO of decimal samples. Never shrinks: `grow` only
/// raises the capacity, preserving existing contents (§3 Lifetimes;
/// §8 idempotence — `reserve` with a smaller quantity is a no-op).
#[derive(Debug)]
struct RingBuffer {
    capacity: usize,
    data: VecDeque<Decimal>,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            data: VecDeque::with_capacity(capacity),
        }
    }

    fn grow(&mut self, capacity: usize) {
        if capacity > self.capacity {
            self.capacity = capacity;
        }
    }

    fn push(&mut self, value: Decimal) {
        self.data.push_back(value);
        while self.data.len() > self.capacity {
            self.data.pop_front();
        }
    }

    fn last(&self) -> Option<Decimal> {
        self.data.back().copied()
    }

    fn set_last(&mut self, value: Decimal) {
        if let Some(last) = self.data.back_mut() {
            *last = value;
        }
    }

    /// Last `<= limit` values, oldest first.
    fn values(&self, limit: usize) -> Vec<Decimal> {
        let len = self.data.len();
        let take = limit.min(len);
        self.data.iter().skip(len - take).copied().collect()
    }
}

struct TimeframeState {
    end_time: i64,
    buffers: HashMap<CandleProperty, RingBuffer>,
}

/// `map<Timeframe, {end_time, per-property ring buffers}>` (§3).
pub struct AnalyserBuffer {
    start_time: i64,
    timeframes: HashMap<Timeframe, TimeframeState>,
}

impl AnalyserBuffer {
    pub fn new(start_time: i64) -> Self {
        Self {
            start_time,
            timeframes: HashMap::new(),
        }
    }

    /// Allocates or grows the ring buffer for `(timeframe, property)` to
    /// capacity `>= quantity`, registering `timeframe` with a rolling
    /// `end_time` seeded at the backtest start if not already tracked.
    pub fn reserve(&mut self, timeframe: Timeframe, property: CandleProperty, quantity: usize) {
        let start_time = self.start_time;
        let state = self
            .timeframes
            .entry(timeframe)
            .or_insert_with(|| TimeframeState {
                end_time: start_time,
                buffers: HashMap::new(),
            });
        state
            .buffers
            .entry(property)
            .and_modify(|buf| buf.grow(quantity))
            .or_insert_with(|| RingBuffer::new(quantity));
    }

    pub fn is_registered(&self, timeframe: Timeframe) -> bool {
        self.timeframes.contains_key(&timeframe)
    }

    /// Last `<= limit` values for `(timeframe, property)`, oldest first.
    /// Empty if the pair was never `reserve`d.
    pub fn values(&self, timeframe: Timeframe, property: CandleProperty, limit: usize) -> Vec<Decimal> {
        self.timeframes
            .get(&timeframe)
            .and_then(|state| state.buffers.get(&property))
            .map(|buf| buf.values(limit))
            .unwrap_or_default()
    }

    /// Absorbs one base-timeframe candle into every registered timeframe:
    /// pushes a new bar if the candle crosses that timeframe's current
    /// window, else folds it into the in-progress bar (§4.2).
    pub fn update(&mut self, candle: &Candle) {
        for (timeframe, state) in self.timeframes.iter_mut() {
            if candle.close_time > state.end_time {
                state.end_time = timeframe.estimate_close_time(candle.open_time);
                for (property, buf) in state.buffers.iter_mut() {
                    buf.push(property.initial_value(candle));
                }
            } else {
                for (property, buf) in state.buffers.iter_mut() {
                    match property {
                        CandleProperty::Open => {}
                        CandleProperty::High => {
                            if let Some(last) = buf.last() {
                                if candle.high > last {
                                    buf.set_last(candle.high);
                                }
                            }
                        }
                        CandleProperty::Low => {
                            if let Some(last) = buf.last() {
                                if candle.low < last {
                                    buf.set_last(candle.low);
                                }
                            }
                        }
                        CandleProperty::Close => buf.set_last(candle.close),
                        CandleProperty::Volume => {
                            if let Some(last) = buf.last() {
                                buf.set_last(last + candle.volume);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_candle(open_time: i64, o: Decimal, h: Decimal, l: Decimal, c: Decimal, v: Decimal) -> Candle {
        Candle::new(open_time, open_time + Timeframe::M1.period_ms() - 1, o, h, l, c, v)
    }

    #[test]
    fn reserve_with_smaller_quantity_is_a_no_op() {
        let mut buf = AnalyserBuffer::new(0);
        buf.reserve(Timeframe::M1, CandleProperty::Close, 10);
        buf.reserve(Timeframe::M1, CandleProperty::Close, 3);
        for i in 0..15 {
            buf.update(&base_candle(
                i * Timeframe::M1.period_ms(),
                dec!(1),
                dec!(1),
                dec!(1),
                Decimal::from(i),
                dec!(1),
            ));
        }
        // Capacity stayed at 10 (the larger reservation), not shrunk to 3.
        assert_eq!(buf.values(Timeframe::M1, CandleProperty::Close, 100).len(), 10);
    }

    #[test]
    fn folding_aggregates_base_candles_into_one_higher_timeframe_bar() {
        let mut buf = AnalyserBuffer::new(0);
        for p in [
            CandleProperty::Open,
            CandleProperty::High,
            CandleProperty::Low,
            CandleProperty::Close,
            CandleProperty::Volume,
        ] {
            buf.reserve(Timeframe::M5, p, 5);
        }

        let m1 = Timeframe::M1.period_ms();
        buf.update(&base_candle(0, dec!(100), dec!(105), dec!(95), dec!(102), dec!(10)));
        buf.update(&base_candle(m1, dec!(102), dec!(108), dec!(101), dec!(104), dec!(20)));
        buf.update(&base_candle(2 * m1, dec!(104), dec!(106), dec!(90), dec!(95), dec!(15)));
        buf.update(&base_candle(3 * m1, dec!(95), dec!(96), dec!(93), dec!(94), dec!(5)));
        buf.update(&base_candle(4 * m1, dec!(94), dec!(99), dec!(92), dec!(98), dec!(7)));

        assert_eq!(buf.values(Timeframe::M5, CandleProperty::Open, 1), vec![dec!(100)]);
        assert_eq!(buf.values(Timeframe::M5, CandleProperty::High, 1), vec![dec!(108)]);
        assert_eq!(buf.values(Timeframe::M5, CandleProperty::Low, 1), vec![dec!(90)]);
        assert_eq!(buf.values(Timeframe::M5, CandleProperty::Close, 1), vec![dec!(98)]);
        assert_eq!(buf.values(Timeframe::M5, CandleProperty::Volume, 1), vec![dec!(57)]);
    }

    #[test]
    fn candle_crossing_the_window_pushes_a_new_bar() {
        let mut buf = AnalyserBuffer::new(0);
        buf.reserve(Timeframe::M5, CandleProperty::Close, 5);
        let m1 = Timeframe::M1.period_ms();
        for i in 0..5 {
            buf.update(&base_candle(i * m1, dec!(1), dec!(1), dec!(1), Decimal::from(i), dec!(1)));
        }
        buf.update(&base_candle(5 * m1, dec!(1), dec!(1), dec!(1), dec!(99), dec!(1)));
        let values = buf.values(Timeframe::M5, CandleProperty::Close, 2);
        assert_eq!(values, vec![dec!(4), dec!(99)]);
    }

    #[test]
    fn unreserved_pair_returns_empty() {
        let buf = AnalyserBuffer::new(0);
        assert!(buf.values(Timeframe::D1, CandleProperty::Close, 10).is_empty());
    }
}
