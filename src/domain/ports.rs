//! Trait seams external collaborators implement (§6): a candle source
//! feeding the driver, and a strategy reacting to it. Both are consumed
//! synchronously — §5 rules out any async/channel architecture here.

use crate::domain::broker::BrokerProxy;
use crate::domain::errors::OrderError;
use crate::domain::indicators::IndicatorRequirement;
use crate::domain::market::{AnalyserBuffer, Candle, CandlesView, Timeframe};

/// A historical candle feed (§6.1). `create` must yield candles with
/// `since <= open_time` and `close_time < until`, in monotonically
/// non-decreasing `open_time` order; missing periods are allowed.
pub trait CandleSource {
    type Error: std::error::Error + 'static;

    fn timeframe(&self) -> Timeframe;
    fn symbol(&self) -> &str;
    fn title(&self) -> &str;
    fn create(&self, since: i64, until: i64) -> Box<dyn Iterator<Item = Result<Candle, Self::Error>>>;
}

/// A rule-based trading strategy (§6.2). `tick` is invoked once per closed
/// base candle, after the broker and buffer have both absorbed it; any
/// orders it submits take effect starting on the *next* candle (§5).
pub trait Strategy {
    fn title(&self) -> &str;
    fn candle_timeframes(&self) -> Vec<Timeframe>;
    fn indicators(&self) -> Vec<IndicatorRequirement>;

    fn tick(&mut self, broker: &mut BrokerProxy<'_>, analyser: &AnalyserBuffer, candles: CandlesView<'_>);
}

/// Reports a submission error from `tick` without aborting the backtest
/// (§7 — submission failures are non-fatal, unlike a [`BrokerError`]).
///
/// Strategies are free to ignore the `Result` returned by
/// [`BrokerProxy`](crate::domain::broker::BrokerProxy) submission methods;
/// this alias just names the error type they'll see.
pub type SubmissionResult<T> = Result<T, OrderError>;
