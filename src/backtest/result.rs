//! Result aggregation (§6.4, §13): bundles the ending balance, trade log,
//! and order history of a completed (or early-terminated) run into the
//! report consumers read, plus on-demand P/L statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::errors::PnlError;
use crate::domain::pnl::{self, PnlAlgorithm, Stats};
use crate::domain::trading::{Order, Trade};

/// The window a run covers, reported alongside the outcome. Backtests are
/// deterministic replays over historical data, not wall-clock events, so
/// this is the requested `[since, until)` simulation window rather than a
/// timestamp of when the report was produced (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWindow {
    pub since: i64,
    pub until: i64,
}

/// A `BacktestingResult` (§6.4): everything a report consumer needs about
/// one completed run, independent of which P/L algorithm it inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestingResult {
    pub strategy_title: String,
    pub date: RunWindow,
    pub start_balance: Decimal,
    pub result_balance: Decimal,
    pub total_gain: Decimal,
    pub total_gain_percent: Decimal,
    pub trades: Vec<Trade>,
    pub orders: Vec<Order>,
}

impl BacktestingResult {
    pub fn new(
        strategy_title: String,
        date: RunWindow,
        start_balance: Decimal,
        result_balance: Decimal,
        trades: Vec<Trade>,
        orders: Vec<Order>,
    ) -> Self {
        let total_gain = result_balance - start_balance;
        let total_gain_percent = if start_balance.is_zero() {
            Decimal::ZERO
        } else {
            total_gain / start_balance * Decimal::from(100u64)
        };
        Self {
            strategy_title,
            date,
            start_balance,
            result_balance,
            total_gain,
            total_gain_percent,
            trades,
            orders,
        }
    }

    pub fn trades_count(&self) -> usize {
        self.trades.len()
    }

    pub fn orders_count(&self) -> usize {
        self.orders.len()
    }

    /// Runs P/L attribution over the trade log under `algorithm` ("FIFO",
    /// "LIFO", or "AVCO") and returns the derived aggregate statistics
    /// (§6.4). Fails with `UnexpectedProfitLossAlgorithm` for any other
    /// string, or `InvalidSellAmount` if the trade log itself is malformed
    /// (a SELL exceeding its lots — should not happen for a log the broker
    /// produced itself, but is surfaced rather than panicked on).
    pub fn get_stats(&self, algorithm: &str) -> Result<Stats, PnlError> {
        let algorithm: PnlAlgorithm = algorithm.parse()?;
        let profits = pnl::attribute(&self.trades, algorithm)?;
        Ok(Stats::from_profits(&profits))
    }
}
