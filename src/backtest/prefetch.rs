//! Prefetch window computation (§4.10): given the indicator requirements a
//! strategy declares, work out how many base-timeframe candles must be
//! consumed before the simulation becomes visible to it, and from what
//! point the candle source should be asked to start yielding.

use crate::domain::indicators::IndicatorRequirement;
use crate::domain::market::Timeframe;

use super::config::PrefetchOption;

/// The resolved prefetch window for one run: where to ask the candle source
/// to start (`fetch_since`), and the base-timeframe open time at which the
/// simulation becomes visible to the strategy (`simulation_start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchPlan {
    pub fetch_since: i64,
    pub simulation_start: i64,
}

/// `needed_base = ceil(max_samples * (tf_period / base_period))` per
/// timeframe requirement, maximized across every requirement declared
/// (§4.10). Zero if no indicator requires any history.
fn needed_base_candles(requirements: &[IndicatorRequirement], base: Timeframe) -> u64 {
    requirements
        .iter()
        .map(|req| {
            let tf_period = req.timeframe.period_ms();
            let base_period = base.period_ms();
            let scaled = req.quantity as i64 * tf_period;
            scaled.div_ceil(base_period).max(0) as u64
        })
        .max()
        .unwrap_or(0)
}

/// Computes the prefetch plan for `requirements` against `base`'s period,
/// over the requested `[since, until)` window, per the three modes in
/// §4.10. `until` only bounds how far `Since` mode's computed simulation
/// start can be reported relative to the run; it does not clamp the
/// returned timestamps.
pub fn plan(requirements: &[IndicatorRequirement], base: Timeframe, since: i64, option: PrefetchOption) -> PrefetchPlan {
    let needed = needed_base_candles(requirements, base);
    let base_period = base.period_ms();
    match option {
        PrefetchOption::Until => PrefetchPlan {
            fetch_since: since - needed as i64 * base_period,
            simulation_start: since,
        },
        PrefetchOption::Since => PrefetchPlan {
            fetch_since: since,
            simulation_start: since + needed as i64 * base_period,
        },
        PrefetchOption::None => PrefetchPlan {
            fetch_since: since,
            simulation_start: since,
        },
    }
}
