//! Balances, orders and the order repository (§3, §4.4-§4.8).

pub mod balance;
pub mod fees;
pub mod order;
pub mod quantize;
pub mod repository;
pub mod trade;

pub use balance::Balance;
pub use fees::FeeSchedule;
pub use order::{
    Amount, LimitOrderOptions, MarketOrderOptions, Order, OrderKind, OrderSide, OrderStatus,
    StopLossOptions, StrategyOrderLeg, TakeProfitOptions,
};
pub use repository::OrderRepository;
pub use trade::Trade;
