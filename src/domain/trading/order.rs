use crate::domain::errors::OrderError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side TP/SL children spawned off a limit parent take — always
    /// the inverse of the parent's side (§4.9).
    pub fn inverted(&self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Order status state machine (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Activated,
    Executed,
    Cancelled,
    SysCancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Executed | OrderStatus::Cancelled | OrderStatus::SysCancelled
        )
    }

    pub fn is_live(&self) -> bool {
        !self.is_terminal()
    }
}

/// Either an absolute amount or a percentage of the relevant available
/// balance at submission time (§6.5). Exactly one is carried per order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Amount {
    Absolute(Decimal),
    Percentage(Decimal),
}

impl Amount {
    fn validate(&self) -> Result<(), String> {
        match self {
            Amount::Absolute(a) if *a <= Decimal::ZERO => {
                Err(format!("amount must be positive, got {a}"))
            }
            Amount::Percentage(p) if *p <= Decimal::ZERO || *p > Decimal::from(100) => {
                Err(format!("percentage_amount must be in (0, 100], got {p}"))
            }
            _ => Ok(()),
        }
    }

    /// Resolve against `available`, the balance of the relevant asset at
    /// submission time.
    pub fn resolve(&self, available: Decimal) -> Decimal {
        match self {
            Amount::Absolute(a) => *a,
            Amount::Percentage(p) => available * *p / Decimal::from(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitOptions {
    pub trigger_price: Decimal,
    pub order_price: Option<Decimal>,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLossOptions {
    pub trigger_price: Decimal,
    pub order_price: Option<Decimal>,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderOptions {
    pub side: OrderSide,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrderOptions {
    pub side: OrderSide,
    pub order_price: Decimal,
    pub amount: Amount,
    pub take_profit: Option<TakeProfitOptions>,
    pub stop_loss: Option<StopLossOptions>,
}

fn validate_price(label: &str, price: Decimal, problems: &mut Vec<String>) {
    if price <= Decimal::ZERO {
        problems.push(format!("{label} must be positive, got {price}"));
    }
}

fn validate_amount(amount: &Amount, problems: &mut Vec<String>) {
    if let Err(msg) = amount.validate() {
        problems.push(msg);
    }
}

fn finish(problems: Vec<String>) -> Result<(), OrderError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(OrderError::InvalidOrderData {
            reason: problems.join("; "),
        })
    }
}

impl MarketOrderOptions {
    pub fn validate(&self) -> Result<(), OrderError> {
        let mut problems = Vec::new();
        validate_amount(&self.amount, &mut problems);
        finish(problems)
    }
}

impl TakeProfitOptions {
    fn collect_problems(&self, problems: &mut Vec<String>) {
        validate_amount(&self.amount, problems);
        validate_price("take_profit trigger_price", self.trigger_price, problems);
        if let Some(p) = self.order_price {
            validate_price("take_profit order_price", p, problems);
        }
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        let mut problems = Vec::new();
        self.collect_problems(&mut problems);
        finish(problems)
    }
}

impl StopLossOptions {
    fn collect_problems(&self, problems: &mut Vec<String>) {
        validate_amount(&self.amount, problems);
        validate_price("stop_loss trigger_price", self.trigger_price, problems);
        if let Some(p) = self.order_price {
            validate_price("stop_loss order_price", p, problems);
        }
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        let mut problems = Vec::new();
        self.collect_problems(&mut problems);
        finish(problems)
    }
}

impl LimitOrderOptions {
    /// Validates the parent and, if present, the TP/SL options, aggregating
    /// every problem found into a single `InvalidOrderData` (§4.6).
    pub fn validate(&self) -> Result<(), OrderError> {
        let mut problems = Vec::new();
        validate_amount(&self.amount, &mut problems);
        validate_price("order_price", self.order_price, &mut problems);
        if let Some(tp) = &self.take_profit {
            tp.collect_problems(&mut problems);
        }
        if let Some(sl) = &self.stop_loss {
            sl.collect_problems(&mut problems);
        }
        finish(problems)
    }
}

/// Whether a TP/SL order behaves as a market order (no limit leg) or a
/// limit order (`order_price` set) once activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOrderLeg {
    Market,
    Limit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    Market {
        side: OrderSide,
        amount: Decimal,
    },
    Limit {
        side: OrderSide,
        amount: Decimal,
        order_price: Decimal,
        take_profit_opts: Option<TakeProfitOptions>,
        stop_loss_opts: Option<StopLossOptions>,
        take_profit_child_id: Option<u64>,
        stop_loss_child_id: Option<u64>,
    },
    TakeProfit {
        side: OrderSide,
        amount: Decimal,
        trigger_price: Decimal,
        order_price: Option<Decimal>,
    },
    StopLoss {
        side: OrderSide,
        amount: Decimal,
        trigger_price: Decimal,
        order_price: Option<Decimal>,
    },
}

impl OrderKind {
    pub fn side(&self) -> OrderSide {
        match self {
            OrderKind::Market { side, .. }
            | OrderKind::Limit { side, .. }
            | OrderKind::TakeProfit { side, .. }
            | OrderKind::StopLoss { side, .. } => *side,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            OrderKind::Market { amount, .. }
            | OrderKind::Limit { amount, .. }
            | OrderKind::TakeProfit { amount, .. }
            | OrderKind::StopLoss { amount, .. } => *amount,
        }
    }

    pub fn is_strategy_order(&self) -> bool {
        matches!(self, OrderKind::TakeProfit { .. } | OrderKind::StopLoss { .. })
    }

    /// TP/SL behave as market once activated if they carry no `order_price`.
    pub fn strategy_leg(&self) -> Option<StrategyOrderLeg> {
        match self {
            OrderKind::TakeProfit { order_price, .. } | OrderKind::StopLoss { order_price, .. } => {
                Some(if order_price.is_some() {
                    StrategyOrderLeg::Limit
                } else {
                    StrategyOrderLeg::Market
                })
            }
            _ => None,
        }
    }

    /// The resting price a Limit order or an activated TP/SL-Limit leg is
    /// matched against (§4.9). `None` for Market orders and TP/SL-Market legs.
    pub fn order_price(&self) -> Option<Decimal> {
        match self {
            OrderKind::Limit { order_price, .. } => Some(*order_price),
            OrderKind::TakeProfit { order_price, .. } | OrderKind::StopLoss { order_price, .. } => {
                *order_price
            }
            OrderKind::Market { .. } => None,
        }
    }

    /// The price that activates a TP/SL order (§4.9). `None` otherwise.
    pub fn trigger_price(&self) -> Option<Decimal> {
        match self {
            OrderKind::TakeProfit { trigger_price, .. } | OrderKind::StopLoss { trigger_price, .. } => {
                Some(*trigger_price)
            }
            _ => None,
        }
    }
}

/// A live or historical order. Common fields live on the struct; the
/// variant-specific payload lives in [`OrderKind`] (§9 — tagged variants
/// over inheritance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub date_created: i64,
    pub date_updated: i64,
    pub fill_price: Option<Decimal>,
    pub trading_fee: Option<Decimal>,
    pub date_activated: Option<i64>,
}

impl Order {
    pub fn side(&self) -> OrderSide {
        self.kind.side()
    }

    pub fn amount(&self) -> Decimal {
        self.kind.amount()
    }

    pub fn is_unfulfilled(&self) -> bool {
        self.status == OrderStatus::Created
    }

    pub fn is_executed(&self) -> bool {
        self.status == OrderStatus::Executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn non_positive_amount_is_invalid() {
        let opts = MarketOrderOptions {
            side: OrderSide::Buy,
            amount: Amount::Absolute(dec!(0)),
        };
        assert!(matches!(
            opts.validate(),
            Err(OrderError::InvalidOrderData { .. })
        ));
    }

    #[test]
    fn percentage_outside_range_is_invalid() {
        let opts = MarketOrderOptions {
            side: OrderSide::Buy,
            amount: Amount::Percentage(dec!(150)),
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn limit_order_aggregates_child_option_errors() {
        let opts = LimitOrderOptions {
            side: OrderSide::Buy,
            order_price: dec!(100),
            amount: Amount::Absolute(dec!(1)),
            take_profit: Some(TakeProfitOptions {
                trigger_price: dec!(-1),
                order_price: None,
                amount: Amount::Absolute(dec!(1)),
            }),
            stop_loss: Some(StopLossOptions {
                trigger_price: dec!(-1),
                order_price: None,
                amount: Amount::Absolute(dec!(1)),
            }),
        };
        let err = opts.validate().unwrap_err();
        let OrderError::InvalidOrderData { reason } = err else {
            panic!("expected InvalidOrderData");
        };
        assert!(reason.contains("take_profit"));
        assert!(reason.contains("stop_loss"));
    }

    #[test]
    fn valid_limit_order_passes() {
        let opts = LimitOrderOptions {
            side: OrderSide::Buy,
            order_price: dec!(100),
            amount: Amount::Absolute(dec!(1)),
            take_profit: None,
            stop_loss: None,
        };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn amount_resolves_percentage_against_available() {
        let a = Amount::Percentage(dec!(50));
        assert_eq!(a.resolve(dec!(200)), dec!(100));
    }
}
