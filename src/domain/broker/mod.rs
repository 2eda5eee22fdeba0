//! The simulated broker (§4.4-§4.9): balances, order submission and
//! cancellation, TP/SL position sharing, and the per-candle matching
//! algorithm, grounded on the original's `OrderStatus`/`OrderInfo` state
//! machine and the tagged-variant order model in `domain::trading::order`.

mod position;
mod proxy;

pub use position::PositionPool;
pub use proxy::BrokerProxy;

use crate::domain::errors::{BrokerError, CancellationError, OrderError};
use crate::domain::market::Candle;
use crate::domain::trading::quantize::{quantize_floor, quantize_round_half_up};
use crate::domain::trading::{
    Amount, Balance, FeeSchedule, LimitOrderOptions, MarketOrderOptions, Order, OrderKind,
    OrderRepository, OrderSide, OrderStatus, StopLossOptions, TakeProfitOptions, Trade,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    A,
    B,
    C,
}

enum Action {
    None,
    Activate,
    ExecuteLimit(Decimal),
}

/// Whether `reference` (an order's `order_price` or `trigger_price`) is
/// satisfied by `phase`'s checkpoint of `candle`, and if so the fill price
/// to use (§4.9). Phase A/C fill at the checkpoint itself (the order is
/// already at least as well off as it demanded); phase B fills at the
/// extreme of the candle's range most favorable to `side` — the price the
/// order would have been matched at somewhere during the bar's traversal.
fn phase_match(side: OrderSide, reference: Decimal, phase: Phase, candle: &Candle) -> Option<Decimal> {
    match phase {
        Phase::A => match side {
            OrderSide::Buy if candle.open <= reference => Some(candle.open),
            OrderSide::Sell if candle.open >= reference => Some(candle.open),
            _ => None,
        },
        Phase::B => {
            if candle.low <= reference && reference <= candle.high {
                Some(match side {
                    OrderSide::Buy => candle.low,
                    OrderSide::Sell => candle.high,
                })
            } else {
                None
            }
        }
        Phase::C => match side {
            OrderSide::Buy if candle.close <= reference => Some(candle.close),
            OrderSide::Sell if candle.close >= reference => Some(candle.close),
            _ => None,
        },
    }
}

/// The simulated exchange: one fiat/crypto balance, one order repository,
/// one append-only trade log, advanced one candle at a time (§3, §4.9).
pub struct Broker {
    balance: Balance,
    fees: FeeSchedule,
    repository: OrderRepository,
    trades: Vec<Trade>,
    next_trade_id: u64,
    current_time: i64,
    fiat_precision: u32,
    crypto_precision: u32,
    buy_position: PositionPool,
    sell_position: PositionPool,
}

impl Broker {
    pub fn new(start_fiat: Decimal, fees: FeeSchedule, min_fiat: Decimal, min_crypto: Decimal) -> Self {
        Self {
            balance: Balance::new(start_fiat),
            fees,
            repository: OrderRepository::new(),
            trades: Vec::new(),
            next_trade_id: 0,
            current_time: 0,
            fiat_precision: min_fiat.scale(),
            crypto_precision: min_crypto.scale(),
            buy_position: PositionPool::default(),
            sell_position: PositionPool::default(),
        }
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// `available_fiat / (1 + taker_fee)` (§6.3).
    pub fn max_fiat_for_taker(&self) -> Decimal {
        self.balance.available_fiat / (Decimal::ONE + self.fees.taker_fee)
    }

    /// `available_fiat / (1 + maker_fee)` (§6.3).
    pub fn max_fiat_for_maker(&self) -> Decimal {
        self.balance.available_fiat / (Decimal::ONE + self.fees.maker_fee)
    }

    pub fn iter_orders(&self) -> impl Iterator<Item = &Order> {
        self.repository.iter()
    }

    pub fn iter_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn proxy(&mut self) -> BrokerProxy<'_> {
        BrokerProxy::new(self)
    }

    fn side_total(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.balance.fiat,
            OrderSide::Sell => self.balance.crypto,
        }
    }

    fn side_available(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.balance.available_fiat,
            OrderSide::Sell => self.balance.available_crypto,
        }
    }

    fn amount_precision(&self, side: OrderSide) -> u32 {
        match side {
            OrderSide::Buy => self.fiat_precision,
            OrderSide::Sell => self.crypto_precision,
        }
    }

    fn position_pool_mut(&mut self, side: OrderSide) -> &mut PositionPool {
        match side {
            OrderSide::Buy => &mut self.buy_position,
            OrderSide::Sell => &mut self.sell_position,
        }
    }

    fn resolve_amount(&self, side: OrderSide, amount: Amount) -> Decimal {
        quantize_floor(amount.resolve(self.side_available(side)), self.amount_precision(side))
    }

    pub fn submit_market_order(&mut self, opts: MarketOrderOptions) -> Result<u64, OrderError> {
        opts.validate()?;
        let side = opts.side;
        let amount = self.resolve_amount(side, opts.amount);
        match side {
            OrderSide::Buy => self.balance.hold_fiat(self.fees.taker_price(amount))?,
            OrderSide::Sell => self.balance.hold_crypto(amount)?,
        }
        Ok(self.repository.insert(OrderKind::Market { side, amount }, self.current_time))
    }

    pub fn submit_limit_order(&mut self, opts: LimitOrderOptions) -> Result<u64, OrderError> {
        opts.validate()?;
        let side = opts.side;
        let amount = self.resolve_amount(side, opts.amount);
        match side {
            OrderSide::Buy => self.balance.hold_fiat(self.fees.maker_price(amount))?,
            OrderSide::Sell => self.balance.hold_crypto(amount)?,
        }
        Ok(self.repository.insert(
            OrderKind::Limit {
                side,
                amount,
                order_price: opts.order_price,
                take_profit_opts: opts.take_profit,
                stop_loss_opts: opts.stop_loss,
                take_profit_child_id: None,
                stop_loss_child_id: None,
            },
            self.current_time,
        ))
    }

    fn hold_strategy(&mut self, side: OrderSide, total: Decimal) -> Result<(), OrderError> {
        let available = self.side_available(side);
        let hold = self.position_pool_mut(side).required_hold(total, available);
        match side {
            OrderSide::Buy => self.balance.hold_fiat(hold)?,
            OrderSide::Sell => self.balance.hold_crypto(hold)?,
        }
        self.position_pool_mut(side).commit_hold(total, available);
        Ok(())
    }

    pub fn submit_take_profit_order(&mut self, side: OrderSide, opts: TakeProfitOptions) -> Result<u64, OrderError> {
        opts.validate()?;
        let amount = self.resolve_amount(side, opts.amount);
        self.hold_strategy(side, amount)?;
        Ok(self.repository.insert(
            OrderKind::TakeProfit {
                side,
                amount,
                trigger_price: opts.trigger_price,
                order_price: opts.order_price,
            },
            self.current_time,
        ))
    }

    pub fn submit_stop_loss_order(&mut self, side: OrderSide, opts: StopLossOptions) -> Result<u64, OrderError> {
        opts.validate()?;
        let amount = self.resolve_amount(side, opts.amount);
        self.hold_strategy(side, amount)?;
        Ok(self.repository.insert(
            OrderKind::StopLoss {
                side,
                amount,
                trigger_price: opts.trigger_price,
                order_price: opts.order_price,
            },
            self.current_time,
        ))
    }

    pub fn cancel_order(&mut self, id: u64) -> Result<(), CancellationError> {
        let order = self
            .repository
            .get(id)
            .cloned()
            .ok_or(CancellationError::NotFound(id))?;
        if order.status.is_terminal() {
            return Err(CancellationError::TerminalStatus(id));
        }
        self.release_order_hold(&order);
        let result = self.repository.cancel(id, self.current_time);
        if result.is_ok() {
            debug!("Broker: order {id} cancelled by strategy");
        }
        result
    }

    fn release_order_hold(&mut self, order: &Order) {
        let side = order.side();
        match &order.kind {
            OrderKind::Market { amount, .. } => match side {
                OrderSide::Buy => self.balance.release_fiat(self.fees.taker_price(*amount)),
                OrderSide::Sell => self.balance.release_crypto(*amount),
            },
            OrderKind::Limit { amount, .. } => match side {
                OrderSide::Buy => self.balance.release_fiat(self.fees.maker_price(*amount)),
                OrderSide::Sell => self.balance.release_crypto(*amount),
            },
            OrderKind::TakeProfit { amount, .. } | OrderKind::StopLoss { amount, .. } => {
                let total = self.side_total(side);
                let available = self.side_available(side);
                let to_release = self.position_pool_mut(side).release(*amount, total, available);
                match side {
                    OrderSide::Buy => self.balance.release_fiat(to_release),
                    OrderSide::Sell => self.balance.release_crypto(to_release),
                }
            }
        }
    }

    fn sweep_strategy_orders(&mut self, ids: &[u64]) {
        for &id in ids {
            if let Some(order) = self.repository.get(id).cloned() {
                self.release_order_hold(&order);
                self.repository.sys_cancel(id, self.current_time);
                debug!("Broker: order {id} sys-cancelled by position-modifying execution");
            }
        }
    }

    fn activate(&mut self, id: u64) {
        self.repository.activate(id, self.current_time);
        debug!("Broker: order {id} activated on trigger");
        if let Some(order) = self.repository.get(id) {
            if order.kind.order_price().is_none() {
                self.repository.enqueue_market(id);
            }
        }
    }

    fn spawn_children(
        &mut self,
        parent_id: u64,
        take_profit: Option<TakeProfitOptions>,
        stop_loss: Option<StopLossOptions>,
        parent_side: OrderSide,
    ) -> Result<(), BrokerError> {
        let child_side = parent_side.inverted();
        let mut tp_id = None;
        let mut sl_id = None;
        if let Some(opts) = take_profit {
            tp_id = Some(self.submit_take_profit_order(child_side, opts)?);
        }
        if let Some(opts) = stop_loss {
            sl_id = Some(self.submit_stop_loss_order(child_side, opts)?);
        }
        self.repository.link_children(parent_id, tp_id, sl_id);
        Ok(())
    }

    fn finish_execution(&mut self, id: u64, fill_price: Decimal, fee: Decimal) -> Result<(), BrokerError> {
        let fill_price = quantize_round_half_up(fill_price, self.fiat_precision);
        let fee = quantize_round_half_up(fee, self.fiat_precision);
        self.repository.execute(id, fill_price, fee, self.current_time);
        self.next_trade_id += 1;
        let order = self
            .repository
            .get(id)
            .cloned()
            .ok_or_else(|| BrokerError::Invariant(format!("executed order {id} vanished")))?;
        debug!(
            "Broker: order {id} executed at {fill_price} (fee {fee}), trade {}",
            self.next_trade_id
        );
        let result_balance = quantize_round_half_up(self.balance.fiat, self.fiat_precision);
        self.trades.push(Trade::from_executed_order(
            self.next_trade_id,
            &order,
            self.current_time,
            result_balance,
        ));

        // Snapshot the *pre-existing* live strategy orders before spawning this
        // execution's own TP/SL children (§4.8) — a position-modifying execution
        // invalidates every other resting strategy order, not the ones it just
        // created to replace itself.
        let to_sweep = self.repository.live_strategy_ids();

        if let OrderKind::Limit {
            take_profit_opts,
            stop_loss_opts,
            ..
        } = &order.kind
        {
            let tp = take_profit_opts.clone();
            let sl = stop_loss_opts.clone();
            let side = order.side();
            self.spawn_children(id, tp, sl, side)?;
        }

        self.sweep_strategy_orders(&to_sweep);
        Ok(())
    }

    fn execute_market(&mut self, id: u64, open_price: Decimal) -> Result<(), BrokerError> {
        let order = self
            .repository
            .get(id)
            .cloned()
            .ok_or_else(|| BrokerError::Invariant(format!("queued order {id} missing")))?;
        let side = order.side();
        let amount = order.amount();
        let fee = match side {
            OrderSide::Buy => {
                self.balance.withdraw_fiat(self.fees.taker_price(amount));
                self.balance.deposit_crypto(amount / open_price);
                amount * self.fees.taker_fee
            }
            OrderSide::Sell => {
                self.balance.withdraw_crypto(amount);
                self.balance.deposit_fiat(self.fees.taker_gain(amount * open_price));
                amount * open_price * self.fees.taker_fee
            }
        };
        self.finish_execution(id, open_price, fee)
    }

    fn execute_limit(&mut self, id: u64, fill_price: Decimal) -> Result<(), BrokerError> {
        let order = self
            .repository
            .get(id)
            .cloned()
            .ok_or_else(|| BrokerError::Invariant(format!("matched order {id} missing")))?;
        let side = order.side();
        let amount = order.amount();
        let fee = match side {
            OrderSide::Buy => {
                self.balance.withdraw_fiat(self.fees.maker_price(amount));
                self.balance.deposit_crypto(amount / fill_price);
                amount * self.fees.maker_fee
            }
            OrderSide::Sell => {
                self.balance.withdraw_crypto(amount);
                self.balance.deposit_fiat(self.fees.maker_gain(amount * fill_price));
                amount * fill_price * self.fees.maker_fee
            }
        };
        self.finish_execution(id, fill_price, fee)
    }

    fn run_phase(&mut self, candle: &Candle, phase: Phase) -> Result<(), BrokerError> {
        for id in self.repository.price_matched_snapshot() {
            let Some(order) = self.repository.get(id) else {
                continue;
            };
            if !order.status.is_live() {
                continue;
            }
            let side = order.side();
            let action = match (order.status, &order.kind) {
                (OrderStatus::Created, OrderKind::Limit { order_price, .. }) => {
                    match phase_match(side, *order_price, phase, candle) {
                        Some(fill) => Action::ExecuteLimit(fill),
                        None => Action::None,
                    }
                }
                (OrderStatus::Created, OrderKind::TakeProfit { trigger_price, .. })
                | (OrderStatus::Created, OrderKind::StopLoss { trigger_price, .. }) => {
                    if phase_match(side, *trigger_price, phase, candle).is_some() {
                        Action::Activate
                    } else {
                        Action::None
                    }
                }
                (OrderStatus::Activated, _) => match order.kind.order_price() {
                    Some(order_price) => match phase_match(side, order_price, phase, candle) {
                        Some(fill) => Action::ExecuteLimit(fill),
                        None => Action::None,
                    },
                    None => Action::None,
                },
                _ => Action::None,
            };
            match action {
                Action::ExecuteLimit(fill) => self.execute_limit(id, fill)?,
                Action::Activate => self.activate(id),
                Action::None => {}
            }
        }
        Ok(())
    }

    /// Runs one candle through the matching algorithm (§4.9): drains the
    /// market queue at `candle.open`, then scans the limit set through
    /// phases A (open), B (range), C (close) in that fixed order.
    pub fn update(&mut self, candle: &Candle) -> Result<(), BrokerError> {
        self.current_time = candle.close_time;
        for id in self.repository.drain_market_queue() {
            if let Err(err) = self.execute_market(id, candle.open) {
                warn!("Broker: fatal failure executing queued order {id}: {err}");
                return Err(err);
            }
        }
        for phase in [Phase::A, Phase::B, Phase::C] {
            self.run_phase(candle, phase)?;
        }
        Ok(())
    }
}
