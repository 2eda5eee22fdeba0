//! Order storage and indexing (§3, §4.8): an id-keyed map plus the index
//! sets the broker's matching pass scans each candle — a market queue
//! drained in submission order, a price-matched set holding both plain
//! limit orders and TP/SL orders, and a strategy subset of the latter used
//! for position-sharing accounting — along with the parent/child links a
//! limit order's take-profit/stop-loss children need without forming
//! ownership cycles.

use crate::domain::errors::CancellationError;
use crate::domain::trading::order::{Order, OrderKind, OrderStatus};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap, VecDeque};

#[derive(Debug, Default)]
pub struct OrderRepository {
    next_id: u64,
    orders: HashMap<u64, Order>,
    market_queue: VecDeque<u64>,
    /// Orders scanned by the three-phase price match: plain limit orders
    /// and TP/SL orders (both pre- and post-activation with a limit leg).
    price_matched_ids: BTreeSet<u64>,
    /// Subset of `price_matched_ids` that are TP/SL orders, used by the
    /// broker's position-sharing bookkeeping.
    strategy_ids: BTreeSet<u64>,
}

impl OrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Inserts a freshly constructed order (status `Created`), indexing it
    /// by kind, and returns its assigned id.
    pub fn insert(&mut self, kind: OrderKind, created_at: i64) -> u64 {
        let id = self.allocate_id();
        match &kind {
            OrderKind::Market { .. } => self.market_queue.push_back(id),
            OrderKind::Limit { .. } => {
                self.price_matched_ids.insert(id);
            }
            OrderKind::TakeProfit { .. } | OrderKind::StopLoss { .. } => {
                self.price_matched_ids.insert(id);
                self.strategy_ids.insert(id);
            }
        }
        let order = Order {
            id,
            kind,
            status: OrderStatus::Created,
            date_created: created_at,
            date_updated: created_at,
            fill_price: None,
            trading_fee: None,
            date_activated: None,
        };
        self.orders.insert(id, order);
        id
    }

    pub fn get(&self, id: u64) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    fn is_live(&self, id: u64) -> bool {
        self.orders.get(&id).is_some_and(|o| o.status.is_live())
    }

    /// Drains every id currently queued for open-price execution: Market
    /// orders plus TP/SL-Market orders activated on a previous candle.
    /// Cancelled/executed ids are dropped silently.
    pub fn drain_market_queue(&mut self) -> Vec<u64> {
        self.market_queue
            .drain(..)
            .filter(|id| self.orders.get(id).is_some_and(|o| o.status.is_live()))
            .collect()
    }

    /// Moves an activated TP/SL-Market order into the market queue for
    /// open-price execution on the *next* candle's drain.
    pub fn enqueue_market(&mut self, id: u64) {
        self.market_queue.push_back(id);
    }

    /// A snapshot of live price-matched order ids, ascending by id so that
    /// the matching pass iterates deterministically (§5).
    pub fn price_matched_snapshot(&self) -> Vec<u64> {
        self.price_matched_ids
            .iter()
            .copied()
            .filter(|id| self.is_live(*id))
            .collect()
    }

    /// Live TP/SL order ids, ascending by id.
    pub fn live_strategy_ids(&self) -> Vec<u64> {
        self.strategy_ids
            .iter()
            .copied()
            .filter(|id| self.is_live(*id))
            .collect()
    }

    /// Links a limit order to the TP/SL children spawned on its execution
    /// (§4.8). The children themselves carry no back-pointer: the matching
    /// pass treats every live strategy order uniformly regardless of
    /// whether it was submitted standalone or spawned from a limit fill,
    /// which is enough to avoid an ownership cycle.
    pub fn link_children(
        &mut self,
        parent_id: u64,
        take_profit_child_id: Option<u64>,
        stop_loss_child_id: Option<u64>,
    ) {
        if let Some(Order {
            kind:
                OrderKind::Limit {
                    take_profit_child_id: tp_slot,
                    stop_loss_child_id: sl_slot,
                    ..
                },
            ..
        }) = self.orders.get_mut(&parent_id)
        {
            if take_profit_child_id.is_some() {
                *tp_slot = take_profit_child_id;
            }
            if stop_loss_child_id.is_some() {
                *sl_slot = stop_loss_child_id;
            }
        }
    }

    /// Transitions a live order to `Cancelled` (user-requested).
    pub fn cancel(&mut self, id: u64, at: i64) -> Result<(), CancellationError> {
        self.transition_to_cancelled(id, at, OrderStatus::Cancelled)
    }

    /// Transitions a live order to `SysCancelled` (broker-driven, e.g. a
    /// position-modifying execution cancelling sibling strategy orders).
    /// Unlike [`cancel`](Self::cancel), an unknown or already-terminal id
    /// is simply ignored — sys-cancellation sweeps the live set and must
    /// not fail when an order has raced to execution in the same pass.
    pub fn sys_cancel(&mut self, id: u64, at: i64) {
        let _ = self.transition_to_cancelled(id, at, OrderStatus::SysCancelled);
    }

    fn transition_to_cancelled(
        &mut self,
        id: u64,
        at: i64,
        target: OrderStatus,
    ) -> Result<(), CancellationError> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(CancellationError::NotFound(id))?;
        if order.status.is_terminal() {
            return Err(CancellationError::TerminalStatus(id));
        }
        order.status = target;
        order.date_updated = at;
        Ok(())
    }

    pub fn activate(&mut self, id: u64, at: i64) {
        if let Some(order) = self.orders.get_mut(&id) {
            order.status = OrderStatus::Activated;
            order.date_activated = Some(at);
            order.date_updated = at;
        }
    }

    pub fn execute(&mut self, id: u64, fill_price: Decimal, fee: Decimal, at: i64) {
        if let Some(order) = self.orders.get_mut(&id) {
            order.status = OrderStatus::Executed;
            order.fill_price = Some(fill_price);
            order.trading_fee = Some(fee);
            order.date_updated = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::order::OrderSide;
    use rust_decimal_macros::dec;

    fn market(side: OrderSide, amount: Decimal) -> OrderKind {
        OrderKind::Market { side, amount }
    }

    fn limit(side: OrderSide, amount: Decimal, order_price: Decimal) -> OrderKind {
        OrderKind::Limit {
            side,
            amount,
            order_price,
            take_profit_opts: None,
            stop_loss_opts: None,
            take_profit_child_id: None,
            stop_loss_child_id: None,
        }
    }

    #[test]
    fn insert_assigns_monotonic_ids_and_indexes_by_kind() {
        let mut repo = OrderRepository::new();
        let m1 = repo.insert(market(OrderSide::Buy, dec!(1)), 0);
        let l1 = repo.insert(limit(OrderSide::Buy, dec!(1), dec!(100)), 0);
        assert_eq!(m1, 1);
        assert_eq!(l1, 2);
        assert_eq!(repo.drain_market_queue(), vec![m1]);
        assert_eq!(repo.price_matched_snapshot(), vec![l1]);
    }

    #[test]
    fn cancel_rejects_unknown_and_terminal_orders() {
        let mut repo = OrderRepository::new();
        assert!(matches!(
            repo.cancel(99, 0),
            Err(CancellationError::NotFound(99))
        ));
        let id = repo.insert(market(OrderSide::Buy, dec!(1)), 0);
        repo.execute(id, dec!(100), dec!(0.5), 1);
        assert!(matches!(
            repo.cancel(id, 2),
            Err(CancellationError::TerminalStatus(_))
        ));
    }

    #[test]
    fn sys_cancel_ignores_already_terminal_orders() {
        let mut repo = OrderRepository::new();
        let id = repo.insert(market(OrderSide::Sell, dec!(1)), 0);
        repo.execute(id, dec!(50), dec!(0.1), 1);
        repo.sys_cancel(id, 2);
        assert_eq!(repo.get(id).unwrap().status, OrderStatus::Executed);
    }

    #[test]
    fn executed_order_drops_out_of_market_queue() {
        let mut repo = OrderRepository::new();
        let id = repo.insert(market(OrderSide::Sell, dec!(2)), 0);
        repo.execute(id, dec!(50), dec!(0.1), 1);
        assert!(repo.drain_market_queue().is_empty());
    }

    #[test]
    fn link_children_sets_limit_order_child_ids() {
        let mut repo = OrderRepository::new();
        let limit_id = repo.insert(limit(OrderSide::Buy, dec!(1), dec!(100)), 0);
        repo.link_children(limit_id, Some(42), Some(43));
        let OrderKind::Limit {
            take_profit_child_id,
            stop_loss_child_id,
            ..
        } = &repo.get(limit_id).unwrap().kind
        else {
            panic!("expected limit order");
        };
        assert_eq!(*take_profit_child_id, Some(42));
        assert_eq!(*stop_loss_child_id, Some(43));
    }

    #[test]
    fn strategy_orders_are_price_matched_and_tracked() {
        let mut repo = OrderRepository::new();
        let tp = repo.insert(
            OrderKind::TakeProfit {
                side: OrderSide::Sell,
                amount: dec!(1),
                trigger_price: dec!(1200),
                order_price: Some(dec!(1500)),
            },
            0,
        );
        assert_eq!(repo.price_matched_snapshot(), vec![tp]);
        assert_eq!(repo.live_strategy_ids(), vec![tp]);
    }
}
