//! Error taxonomy (§7). One enum per failure domain, mirroring the
//! teacher's split of `TradingError` / `RiskViolation` / `MarketDataError`
//! / `PortfolioError` into narrow, `thiserror`-derived types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Submission-time validation failure. Reported to the strategy; not fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderError {
    #[error("invalid order data: {reason}")]
    InvalidOrderData { reason: String },

    #[error("insufficient funds: need {need}, available {available}")]
    InsufficientFunds { need: Decimal, available: Decimal },
}

/// Cancellation failure. Reported to the strategy; not fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CancellationError {
    #[error("order {0} not found")]
    NotFound(u64),

    #[error("order {0} cannot be canceled from its current status")]
    TerminalStatus(u64),
}

/// Unexpected broker-internal failure. Fatal to the backtest loop: the
/// driver stops iteration and returns the partial result computed so far.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BrokerError {
    #[error("broker invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Raised during P/L attribution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PnlError {
    #[error(
        "sell amount {sell_quantity} exceeds remaining lot quantity {available_quantity}"
    )]
    InvalidSellAmount {
        sell_quantity: Decimal,
        available_quantity: Decimal,
    },

    #[error("unexpected profit/loss algorithm: {0}")]
    UnexpectedAlgorithm(String),
}

/// Raised once at driver construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("unknown timeframe: {value}")]
    UnknownTimeframe { value: String },

    #[error(
        "incompatible timeframe: {requested} is not an integer multiple of base timeframe {base}"
    )]
    IncompatibleTimeframe { requested: String, base: String },
}

/// Top-level error returned by the backtest driver when the run is aborted
/// early by a fatal broker or candle-source failure. The partial trade log
/// and ending balance computed before the failure remain valid.
#[derive(Debug, Error)]
pub enum BacktestError<SourceErr: std::error::Error + 'static> {
    #[error("broker failure: {0}")]
    Broker(#[from] BrokerError),

    #[error("candle source failure: {0}")]
    Source(#[source] SourceErr),

    #[error("construction failure: {0}")]
    Construction(#[from] ConstructionError),
}
