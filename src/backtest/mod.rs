//! Backtest orchestration: run configuration, indicator-warmup prefetching,
//! the per-candle driver loop, and the result report it produces.

pub mod config;
pub mod driver;
pub mod prefetch;
pub mod result;

pub use config::{BacktestConfig, PrefetchOption};
pub use driver::{run, BacktestOutcome};
pub use prefetch::PrefetchPlan;
pub use result::{BacktestingResult, RunWindow};
