//! The backtest driver (§4.11 of §2's component table, §5): wires a
//! candle source and a strategy to a broker and analyser buffer, runs the
//! per-candle loop in the ordering §5 mandates, and hands back a result
//! valid whether the run completed or terminated early on a fatal error.

use crate::domain::broker::Broker;
use crate::domain::errors::{BacktestError, ConstructionError};
use crate::domain::market::{AnalyserBuffer, CandlesView, Timeframe};
use crate::domain::ports::{CandleSource, Strategy};
use crate::domain::trading::FeeSchedule;
use tracing::{info, warn};

use super::config::BacktestConfig;
use super::prefetch::{self, PrefetchPlan};
use super::result::{BacktestingResult, RunWindow};

/// The outcome of one `run` call: a valid [`BacktestingResult`] plus, if
/// the loop was cut short, the fatal [`BacktestError`] that did it. §7's
/// propagation policy treats broker/feed failures as fatal to the loop,
/// not to the partial report — `result` is populated either way.
#[derive(Debug)]
pub struct BacktestOutcome<E: std::error::Error + 'static> {
    pub result: BacktestingResult,
    pub error: Option<BacktestError<E>>,
}

/// Every timeframe a strategy reads — directly via `candle_timeframes` or
/// indirectly through an indicator requirement — must be an integer
/// multiple of the feed's base timeframe (§6.5, §7 `IncompatibleTimeframe`,
/// validated once here at construction).
fn validate_timeframes<T: Strategy>(strategy: &T, base: Timeframe) -> Result<(), ConstructionError> {
    let divides_base = |tf: Timeframe| tf.period_ms() % base.period_ms() == 0;
    for tf in strategy.candle_timeframes() {
        if !divides_base(tf) {
            return Err(ConstructionError::IncompatibleTimeframe {
                requested: tf.to_string(),
                base: base.to_string(),
            });
        }
    }
    for req in strategy.indicators() {
        if !divides_base(req.timeframe) {
            return Err(ConstructionError::IncompatibleTimeframe {
                requested: req.timeframe.to_string(),
                base: base.to_string(),
            });
        }
    }
    Ok(())
}

/// Runs a complete backtest: validates timeframe compatibility, prefetches
/// indicator history per `config.prefetch_option`, then replays every
/// candle the source yields through broker update → buffer update →
/// strategy tick, in that fixed order (§5), starting the tick-visible
/// phase only once the prefetch window has been satisfied.
///
/// Returns `Err` only for the one-time construction check; any failure
/// during the loop itself surfaces as a non-`Completed` [`Termination`]
/// alongside the valid partial result.
pub fn run<S: CandleSource, T: Strategy>(
    source: &S,
    strategy: &mut T,
    config: BacktestConfig,
) -> Result<BacktestOutcome<S::Error>, ConstructionError> {
    let base = source.timeframe();
    validate_timeframes(strategy, base)?;

    let requirements = strategy.indicators();
    let PrefetchPlan {
        fetch_since,
        simulation_start,
    } = prefetch::plan(&requirements, base, config.since, config.prefetch_option);
    info!(
        "Driver: running \"{}\" over {} from {fetch_since} (live from {simulation_start}) to {}",
        strategy.title(),
        source.title(),
        config.until
    );

    let mut broker = Broker::new(
        config.start_money,
        FeeSchedule::new(config.maker_fee, config.taker_fee),
        config.min_fiat,
        config.min_crypto,
    );
    let mut buffer = AnalyserBuffer::new(fetch_since);
    for req in &requirements {
        buffer.reserve(req.timeframe, req.property, req.quantity);
    }

    let mut candles = Vec::new();
    let mut error = None;

    for item in source.create(fetch_since, config.until) {
        let candle = match item {
            Ok(candle) => candle,
            Err(err) => {
                warn!("Driver: candle source failed, terminating with partial result: {err}");
                error = Some(BacktestError::Source(err));
                break;
            }
        };
        if !candle.is_closed {
            continue;
        }

        let live = candle.open_time >= simulation_start;
        if live {
            if let Err(err) = broker.update(&candle) {
                warn!("Driver: broker failure, terminating with partial result: {err}");
                candles.push(candle);
                error = Some(BacktestError::from(err));
                break;
            }
        }
        buffer.update(&candle);
        candles.push(candle);

        if live {
            let view = CandlesView::new(&candles);
            let mut proxy = broker.proxy();
            strategy.tick(&mut proxy, &buffer, view);
        }
    }

    let trades = broker.iter_trades().cloned().collect();
    let orders = broker.iter_orders().cloned().collect();
    let result_balance = broker.balance().fiat;
    let result = BacktestingResult::new(
        strategy.title().to_string(),
        RunWindow {
            since: config.since,
            until: config.until,
        },
        config.start_money,
        result_balance,
        trades,
        orders,
    );
    info!(
        "Driver: run finished, {} trades, ending balance {result_balance}",
        result.trades_count()
    );

    Ok(BacktestOutcome { result, error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::broker::BrokerProxy;
    use crate::domain::indicators::IndicatorRequirement;
    use crate::domain::market::{Candle, CandleProperty};
    use crate::domain::trading::{Amount, MarketOrderOptions, OrderSide};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::fmt;

    #[derive(Debug, Clone)]
    struct SourceError(String);
    impl fmt::Display for SourceError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }
    impl std::error::Error for SourceError {}

    struct VecSource {
        timeframe: Timeframe,
        candles: Vec<Result<Candle, SourceError>>,
    }

    impl CandleSource for VecSource {
        type Error = SourceError;

        fn timeframe(&self) -> Timeframe {
            self.timeframe
        }

        fn symbol(&self) -> &str {
            "TEST"
        }

        fn title(&self) -> &str {
            "vec-source"
        }

        fn create(&self, since: i64, until: i64) -> Box<dyn Iterator<Item = Result<Candle, Self::Error>>> {
            let filtered: Vec<_> = self
                .candles
                .clone()
                .into_iter()
                .filter(|item| match item {
                    Ok(c) => c.open_time >= since && c.close_time < until,
                    Err(_) => true,
                })
                .collect();
            Box::new(filtered.into_iter())
        }
    }

    fn make_candles(n: i64, start: i64, tf: Timeframe, close: impl Fn(i64) -> Decimal) -> Vec<Result<Candle, SourceError>> {
        let period = tf.period_ms();
        (0..n)
            .map(|i| {
                let open_time = start + i * period;
                let c = close(i);
                Ok(Candle::new(open_time, open_time + period - 1, c, c, c, c, dec!(1)))
            })
            .collect()
    }

    struct DoNothingStrategy;
    impl Strategy for DoNothingStrategy {
        fn title(&self) -> &str {
            "do-nothing"
        }
        fn candle_timeframes(&self) -> Vec<Timeframe> {
            vec![]
        }
        fn indicators(&self) -> Vec<IndicatorRequirement> {
            vec![]
        }
        fn tick(&mut self, _broker: &mut BrokerProxy<'_>, _analyser: &AnalyserBuffer, _candles: CandlesView<'_>) {}
    }

    #[derive(Default)]
    struct TickCountingStrategy {
        ticks: usize,
    }
    impl Strategy for TickCountingStrategy {
        fn title(&self) -> &str {
            "tick-counter"
        }
        fn candle_timeframes(&self) -> Vec<Timeframe> {
            vec![]
        }
        fn indicators(&self) -> Vec<IndicatorRequirement> {
            vec![IndicatorRequirement::new(Timeframe::M1, CandleProperty::Close, 3)]
        }
        fn tick(&mut self, _broker: &mut BrokerProxy<'_>, _analyser: &AnalyserBuffer, _candles: CandlesView<'_>) {
            self.ticks += 1;
        }
    }

    struct IncompatibleStrategy;
    impl Strategy for IncompatibleStrategy {
        fn title(&self) -> &str {
            "incompatible"
        }
        fn candle_timeframes(&self) -> Vec<Timeframe> {
            vec![Timeframe::M3]
        }
        fn indicators(&self) -> Vec<IndicatorRequirement> {
            vec![]
        }
        fn tick(&mut self, _broker: &mut BrokerProxy<'_>, _analyser: &AnalyserBuffer, _candles: CandlesView<'_>) {}
    }

    struct BuyOnceStrategy {
        submitted: bool,
    }
    impl Strategy for BuyOnceStrategy {
        fn title(&self) -> &str {
            "buy-once"
        }
        fn candle_timeframes(&self) -> Vec<Timeframe> {
            vec![]
        }
        fn indicators(&self) -> Vec<IndicatorRequirement> {
            vec![]
        }
        fn tick(&mut self, broker: &mut BrokerProxy<'_>, _analyser: &AnalyserBuffer, _candles: CandlesView<'_>) {
            if !self.submitted {
                let amount = broker.max_fiat_for_taker();
                broker
                    .submit_market_order(MarketOrderOptions {
                        side: OrderSide::Buy,
                        amount: Amount::Absolute(amount),
                    })
                    .unwrap();
                self.submitted = true;
            }
        }
    }

    fn config(since: i64, until: i64) -> BacktestConfig {
        BacktestConfig::new(dec!(10000), since, until, dec!(0.005), dec!(0.005))
    }

    #[test]
    fn incompatible_timeframe_fails_at_construction() {
        let source = VecSource {
            timeframe: Timeframe::M5,
            candles: vec![],
        };
        let mut strategy = IncompatibleStrategy;
        let err = run(&source, &mut strategy, config(0, 1_000_000)).unwrap_err();
        assert!(matches!(err, ConstructionError::IncompatibleTimeframe { .. }));
    }

    #[test]
    fn a_do_nothing_strategy_leaves_balance_unchanged() {
        let tf = Timeframe::M1;
        let candles = make_candles(10, 0, tf, |i| Decimal::from(100 + i));
        let until = candles.last().unwrap().as_ref().unwrap().close_time + 1;
        let source = VecSource { timeframe: tf, candles };
        let mut strategy = DoNothingStrategy;
        let outcome = run(&source, &mut strategy, config(0, until)).unwrap();
        assert!(outcome.error.is_none());
        assert_eq!(outcome.result.result_balance, dec!(10000));
        assert_eq!(outcome.result.trades_count(), 0);
    }

    #[test]
    fn prefetch_until_delays_no_ticks_until_warmup_satisfied_by_history() {
        let tf = Timeframe::M1;
        // 3 bars of prefetch history plus 5 live bars.
        let candles = make_candles(8, -3 * tf.period_ms(), tf, |i| Decimal::from(100 + i));
        let until = candles.last().unwrap().as_ref().unwrap().close_time + 1;
        let source = VecSource { timeframe: tf, candles };
        let mut strategy = TickCountingStrategy::default();
        let mut cfg = config(0, until);
        cfg.prefetch_option = crate::backtest::config::PrefetchOption::Until;
        let outcome = run(&source, &mut strategy, cfg).unwrap();
        assert!(outcome.error.is_none());
        // Only the 5 candles at/after `since=0` are live.
        assert_eq!(strategy.ticks, 5);
    }

    #[test]
    fn a_source_error_terminates_the_loop_with_a_valid_partial_result() {
        let tf = Timeframe::M1;
        let mut candles = make_candles(3, 0, tf, |i| Decimal::from(100 + i));
        candles.push(Err(SourceError("feed dropped".to_string())));
        candles.extend(make_candles(3, 4 * tf.period_ms(), tf, |i| Decimal::from(200 + i)));
        let until = 10 * tf.period_ms();
        let source = VecSource { timeframe: tf, candles };
        let mut strategy = DoNothingStrategy;
        let outcome = run(&source, &mut strategy, config(0, until)).unwrap();
        assert!(matches!(outcome.error, Some(BacktestError::Source(_))));
        assert_eq!(outcome.result.start_balance, dec!(10000));
    }

    #[test]
    fn a_market_buy_submitted_on_tick_executes_on_the_next_candle() {
        let tf = Timeframe::M1;
        let candles = make_candles(3, 0, tf, |_| dec!(1000));
        let until = candles.last().unwrap().as_ref().unwrap().close_time + 1;
        let source = VecSource { timeframe: tf, candles };
        let mut strategy = BuyOnceStrategy { submitted: false };
        let outcome = run(&source, &mut strategy, config(0, until)).unwrap();
        assert_eq!(outcome.result.trades_count(), 1);
        assert!(outcome.result.result_balance < dec!(10000));
    }
}
