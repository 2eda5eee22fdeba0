//! Read-mostly view of the broker handed to a [`Strategy`](crate::domain::ports::Strategy)
//! on each tick (§6.3): submission and cancellation stay available, but
//! `update` — advancing the simulation a candle — does not, so a strategy
//! can never drive the clock itself.

use super::Broker;
use crate::domain::errors::{CancellationError, OrderError};
use crate::domain::trading::{Balance, LimitOrderOptions, MarketOrderOptions, Order, OrderSide, StopLossOptions, TakeProfitOptions, Trade};
use rust_decimal::Decimal;

pub struct BrokerProxy<'a> {
    broker: &'a mut Broker,
}

impl<'a> BrokerProxy<'a> {
    pub(super) fn new(broker: &'a mut Broker) -> Self {
        Self { broker }
    }

    pub fn balance(&self) -> Balance {
        self.broker.balance()
    }

    pub fn max_fiat_for_taker(&self) -> Decimal {
        self.broker.max_fiat_for_taker()
    }

    pub fn max_fiat_for_maker(&self) -> Decimal {
        self.broker.max_fiat_for_maker()
    }

    pub fn iter_orders(&self) -> impl Iterator<Item = &Order> {
        self.broker.iter_orders()
    }

    pub fn iter_trades(&self) -> impl Iterator<Item = &Trade> {
        self.broker.iter_trades()
    }

    pub fn submit_market_order(&mut self, opts: MarketOrderOptions) -> Result<u64, OrderError> {
        self.broker.submit_market_order(opts)
    }

    pub fn submit_limit_order(&mut self, opts: LimitOrderOptions) -> Result<u64, OrderError> {
        self.broker.submit_limit_order(opts)
    }

    pub fn submit_take_profit_order(&mut self, side: OrderSide, opts: TakeProfitOptions) -> Result<u64, OrderError> {
        self.broker.submit_take_profit_order(side, opts)
    }

    pub fn submit_stop_loss_order(&mut self, side: OrderSide, opts: StopLossOptions) -> Result<u64, OrderError> {
        self.broker.submit_stop_loss_order(side, opts)
    }

    pub fn cancel_order(&mut self, id: u64) -> Result<(), CancellationError> {
        self.broker.cancel_order(id)
    }
}
