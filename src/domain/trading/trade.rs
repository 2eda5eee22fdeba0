use crate::domain::trading::order::{Order, OrderSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single execution event, recorded once an order fills (§3). Distinct
/// from [`Order`]: an order carries its own fill/fee fields once executed,
/// but the trade log is an append-only sequence independent of order
/// lifecycle, suited for P/L attribution and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub order_id: u64,
    pub side: OrderSide,
    pub amount: Decimal,
    pub fill_price: Decimal,
    pub fee: Decimal,
    pub executed_at: i64,
    /// The fiat balance at the moment this order executed (§3).
    pub result_balance: Decimal,
}

impl Trade {
    /// Builds a trade record from an order that has just transitioned to
    /// `Executed`. Panics if the order is missing its fill data — callers
    /// must only invoke this after setting `fill_price`/`trading_fee`.
    /// `result_balance` is the fiat balance at the moment of execution,
    /// already quantized to the broker's fiat precision.
    pub fn from_executed_order(id: u64, order: &Order, executed_at: i64, result_balance: Decimal) -> Self {
        Self {
            id,
            order_id: order.id,
            side: order.side(),
            amount: order.amount(),
            fill_price: order
                .fill_price
                .expect("executed order must carry a fill_price"),
            fee: order
                .trading_fee
                .expect("executed order must carry a trading_fee"),
            executed_at,
            result_balance,
        }
    }
}
