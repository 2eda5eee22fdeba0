//! Backtest-run configuration (§6.5): the inputs a driver caller supplies
//! once per run, separate from the per-order submission options that live
//! in `domain::trading::order`.

use rust_decimal::Decimal;

/// How much history to pull before the user-visible simulation begins
/// (§4.10). `Until` is the default — it is the only mode that starts the
/// visible simulation exactly at the requested `since`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefetchOption {
    /// Pull `needed` base candles *before* `since`; simulation starts at
    /// `since` itself.
    #[default]
    Until,
    /// Pull starting at `since`; simulation starts at `since + needed *
    /// base_period` once the warmup window has filled.
    Since,
    /// Reserve buffer capacity but preload nothing; the simulation starts
    /// at `since` with indicators warming up live.
    None,
}

/// Run-level configuration a driver caller supplies (§6.5): starting fiat
/// balance, the requested date range, fee schedule, decimal precisions, and
/// the prefetch strategy. `min_fiat`/`min_crypto` are broker-construction
/// parameters per §9's Open Question, re-exposed here so a caller never has
/// to reach past the driver into the broker directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub start_money: Decimal,
    pub since: i64,
    pub until: i64,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    pub min_fiat: Decimal,
    pub min_crypto: Decimal,
    pub prefetch_option: PrefetchOption,
}

impl BacktestConfig {
    pub fn new(start_money: Decimal, since: i64, until: i64, maker_fee: Decimal, taker_fee: Decimal) -> Self {
        Self {
            start_money,
            since,
            until,
            maker_fee,
            taker_fee,
            min_fiat: Decimal::new(1, 2),
            min_crypto: Decimal::new(1, 8),
            prefetch_option: PrefetchOption::default(),
        }
    }

    pub fn with_precision(mut self, min_fiat: Decimal, min_crypto: Decimal) -> Self {
        self.min_fiat = min_fiat;
        self.min_crypto = min_crypto;
        self
    }

    pub fn with_prefetch(mut self, prefetch_option: PrefetchOption) -> Self {
        self.prefetch_option = prefetch_option;
        self
    }
}
