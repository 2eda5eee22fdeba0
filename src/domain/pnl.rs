//! Profit/loss attribution (§4.11): FIFO/LIFO/AVCO lot matching over a
//! trade log, plus the aggregate statistics derived from it. Grounded on
//! the original's lot-queue matching shape, carried into a single module
//! since the three algorithms differ only in which end of the lot queue
//! (or how much of each lot) a SELL consumes.

use crate::domain::errors::PnlError;
use crate::domain::trading::{OrderSide, Trade};
use rust_decimal::Decimal;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnlAlgorithm {
    Fifo,
    Lifo,
    Avco,
}

impl std::str::FromStr for PnlAlgorithm {
    type Err = PnlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIFO" => Ok(PnlAlgorithm::Fifo),
            "LIFO" => Ok(PnlAlgorithm::Lifo),
            "AVCO" => Ok(PnlAlgorithm::Avco),
            other => Err(PnlError::UnexpectedAlgorithm(other.to_string())),
        }
    }
}

/// One BUY's unconsumed remainder, tracked until SELLs exhaust it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Lot {
    fill_price: Decimal,
    original_quantity: Decimal,
    remaining_quantity: Decimal,
    remaining_fee: Decimal,
}

impl Lot {
    fn from_buy(trade: &Trade) -> Self {
        // BUY trades carry their fiat-denominated notional in `amount`;
        // the crypto quantity acquired is `amount_fiat / fill_price` (§4.11).
        let quantity = trade.amount / trade.fill_price;
        Self {
            fill_price: trade.fill_price,
            original_quantity: quantity,
            remaining_quantity: quantity,
            remaining_fee: trade.fee,
        }
    }
}

/// Per-SELL profit, computed once its cost basis has been assembled from
/// one or more consumed lots (§4.11).
#[derive(Debug, Clone, PartialEq)]
pub struct TradeProfit {
    pub sell_trade_id: u64,
    pub gain: Decimal,
    pub cost_basis: Decimal,
    pub absolute: Decimal,
    pub relative: Option<Decimal>,
}

/// Consumes `sell_quantity` from the front (FIFO) or back (LIFO) of `lots`,
/// partially taking the final lot touched and prorating its fee by
/// `taken_qty / original_qty` (§4.11).
fn consume_ordered(lots: &mut VecDeque<Lot>, mut remaining: Decimal, from_front: bool) -> Decimal {
    let mut cost_basis = Decimal::ZERO;
    while remaining > Decimal::ZERO {
        let lot = if from_front { lots.front_mut() } else { lots.back_mut() }
            .expect("caller already verified sufficient remaining quantity");
        if lot.remaining_quantity <= remaining {
            cost_basis += lot.remaining_quantity * lot.fill_price + lot.remaining_fee;
            remaining -= lot.remaining_quantity;
            if from_front {
                lots.pop_front();
            } else {
                lots.pop_back();
            }
        } else {
            let taken_qty = remaining;
            let fee_taken = lot.remaining_fee * taken_qty / lot.original_quantity;
            cost_basis += taken_qty * lot.fill_price + fee_taken;
            lot.remaining_quantity -= taken_qty;
            lot.remaining_fee -= fee_taken;
            remaining = Decimal::ZERO;
        }
    }
    cost_basis
}

/// Consumes `sell_quantity` evenly across every remaining lot, round by
/// round: each round divides what's left by the current lot count, takes a
/// lot wholly if its remainder doesn't exceed that share, else shaves the
/// share off proportionally (§4.11).
fn consume_avco(lots: &mut VecDeque<Lot>, mut remaining: Decimal) -> Decimal {
    let mut cost_basis = Decimal::ZERO;
    while remaining > Decimal::ZERO {
        let share = remaining / Decimal::from(lots.len() as u64);
        let mut i = 0;
        while i < lots.len() {
            if lots[i].remaining_quantity <= share {
                let lot = lots.remove(i).expect("index bounded by len() above");
                cost_basis += lot.remaining_quantity * lot.fill_price + lot.remaining_fee;
                remaining -= lot.remaining_quantity;
                // lots shifted left; re-check the same index next iteration.
            } else {
                let lot = &mut lots[i];
                let fee_share = lot.remaining_fee * share / lot.original_quantity;
                cost_basis += share * lot.fill_price + fee_share;
                lot.remaining_quantity -= share;
                lot.remaining_fee -= fee_share;
                remaining -= share;
                i += 1;
            }
        }
    }
    cost_basis
}

/// Runs every trade in `trades` (assumed chronologically ordered) through
/// `algorithm`'s lot matching, returning one [`TradeProfit`] per SELL.
pub fn attribute(trades: &[Trade], algorithm: PnlAlgorithm) -> Result<Vec<TradeProfit>, PnlError> {
    let mut lots: VecDeque<Lot> = VecDeque::new();
    let mut profits = Vec::new();

    for trade in trades {
        match trade.side {
            OrderSide::Buy => lots.push_back(Lot::from_buy(trade)),
            OrderSide::Sell => {
                let available: Decimal = lots.iter().map(|l| l.remaining_quantity).sum();
                if trade.amount > available {
                    return Err(PnlError::InvalidSellAmount {
                        sell_quantity: trade.amount,
                        available_quantity: available,
                    });
                }
                let cost_basis = match algorithm {
                    PnlAlgorithm::Fifo => consume_ordered(&mut lots, trade.amount, true),
                    PnlAlgorithm::Lifo => consume_ordered(&mut lots, trade.amount, false),
                    PnlAlgorithm::Avco => consume_avco(&mut lots, trade.amount),
                };
                let gain = trade.amount * trade.fill_price - trade.fee;
                let absolute = gain - cost_basis;
                let relative = if cost_basis.is_zero() {
                    None
                } else {
                    Some(gain / (cost_basis / Decimal::from(100u64)) - Decimal::from(100u64))
                };
                profits.push(TradeProfit {
                    sell_trade_id: trade.id,
                    gain,
                    cost_basis,
                    absolute,
                    relative,
                });
            }
        }
    }

    Ok(profits)
}

/// Aggregate statistics over a completed P/L attribution (§4.11). Ratios
/// that would divide by zero are `None` rather than a Decimal `NaN`, which
/// `rust_decimal` cannot represent.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub wins: u64,
    pub losses: u64,
    pub total_gain: Decimal,
    pub total_loss: Decimal,
    pub avg_profit: Option<Decimal>,
    pub profit_loss_ratio: Option<Decimal>,
    pub win_loss_ratio: Option<Decimal>,
    pub win_rate_percent: Option<Decimal>,
    pub best_by_relative: Option<TradeProfit>,
    pub worst_by_relative: Option<TradeProfit>,
    pub best_by_absolute: Option<TradeProfit>,
    pub worst_by_absolute: Option<TradeProfit>,
}

impl Stats {
    pub fn from_profits(profits: &[TradeProfit]) -> Self {
        let mut wins = 0u64;
        let mut losses = 0u64;
        let mut total_gain = Decimal::ZERO;
        let mut total_loss = Decimal::ZERO;
        for p in profits {
            if p.absolute > Decimal::ZERO {
                wins += 1;
                total_gain += p.absolute;
            } else if p.absolute < Decimal::ZERO {
                losses += 1;
                total_loss += -p.absolute;
            }
        }
        let sells = profits.len() as u64;
        let avg_profit = (wins > 0).then(|| total_gain / Decimal::from(wins));
        let profit_loss_ratio = match (avg_profit, losses) {
            (Some(avg), losses) if losses > 0 => Some(avg / (total_loss / Decimal::from(losses))),
            _ => None,
        };
        let win_loss_ratio = (losses > 0).then(|| Decimal::from(wins) / Decimal::from(losses));
        let win_rate_percent =
            (sells > 0).then(|| Decimal::from(wins) / Decimal::from(sells) * Decimal::from(100u64));

        let best_by_relative = max_by_key(profits, |p| p.relative);
        let worst_by_relative = min_by_key(profits, |p| p.relative);
        let best_by_absolute = profits.iter().max_by_key(|p| p.absolute).cloned();
        let worst_by_absolute = profits.iter().min_by_key(|p| p.absolute).cloned();

        Self {
            wins,
            losses,
            total_gain,
            total_loss,
            avg_profit,
            profit_loss_ratio,
            win_loss_ratio,
            win_rate_percent,
            best_by_relative,
            worst_by_relative,
            best_by_absolute,
            worst_by_absolute,
        }
    }
}

fn max_by_key(profits: &[TradeProfit], key: impl Fn(&TradeProfit) -> Option<Decimal>) -> Option<TradeProfit> {
    profits
        .iter()
        .filter(|p| key(p).is_some())
        .max_by_key(|p| key(p).unwrap())
        .cloned()
}

fn min_by_key(profits: &[TradeProfit], key: impl Fn(&TradeProfit) -> Option<Decimal>) -> Option<TradeProfit> {
    profits
        .iter()
        .filter(|p| key(p).is_some())
        .min_by_key(|p| key(p).unwrap())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buy(id: u64, amount: Decimal, fill_price: Decimal, fee: Decimal) -> Trade {
        Trade {
            id,
            order_id: id,
            side: OrderSide::Buy,
            amount,
            fill_price,
            fee,
            executed_at: id as i64,
            result_balance: Decimal::ZERO,
        }
    }

    fn sell(id: u64, amount: Decimal, fill_price: Decimal, fee: Decimal) -> Trade {
        Trade {
            id,
            order_id: id,
            side: OrderSide::Sell,
            amount,
            fill_price,
            fee,
            executed_at: id as i64,
            result_balance: Decimal::ZERO,
        }
    }

    #[test]
    fn fifo_consumes_the_oldest_lot_first() {
        // Lot 1: 10 @ 100 (qty 0.1); Lot 2: 10 @ 200 (qty 0.05).
        let trades = vec![
            buy(1, dec!(10), dec!(100), dec!(0)),
            buy(2, dec!(10), dec!(200), dec!(0)),
            sell(3, dec!(0.1), dec!(150), dec!(0)),
        ];
        let profits = attribute(&trades, PnlAlgorithm::Fifo).unwrap();
        assert_eq!(profits.len(), 1);
        assert_eq!(profits[0].cost_basis, dec!(10));
        assert_eq!(profits[0].gain, dec!(15));
        assert_eq!(profits[0].absolute, dec!(5));
    }

    #[test]
    fn lifo_consumes_the_newest_lot_first() {
        let trades = vec![
            buy(1, dec!(10), dec!(100), dec!(0)),
            buy(2, dec!(10), dec!(200), dec!(0)),
            sell(3, dec!(0.05), dec!(250), dec!(0)),
        ];
        let profits = attribute(&trades, PnlAlgorithm::Lifo).unwrap();
        // Entirely the newer 0.05 @ 200 lot.
        assert_eq!(profits[0].cost_basis, dec!(10));
    }

    #[test]
    fn avco_spreads_evenly_across_lots() {
        // Two equal-size lots of 0.1 @ 100 and 0.1 @ 300; average cost 200/unit.
        let trades = vec![
            buy(1, dec!(10), dec!(100), dec!(0)),
            buy(2, dec!(30), dec!(300), dec!(0)),
            sell(3, dec!(0.2), dec!(250), dec!(0)),
        ];
        let profits = attribute(&trades, PnlAlgorithm::Avco).unwrap();
        assert_eq!(profits[0].cost_basis, dec!(40)); // 0.1*100 + 0.1*300
    }

    #[test]
    fn oversized_sell_is_rejected() {
        let trades = vec![buy(1, dec!(10), dec!(100), dec!(0)), sell(2, dec!(1), dec!(150), dec!(0))];
        assert!(matches!(
            attribute(&trades, PnlAlgorithm::Fifo),
            Err(PnlError::InvalidSellAmount { .. })
        ));
    }

    #[test]
    fn stats_separate_wins_from_losses_and_skip_zero_net_trades() {
        let profits = vec![
            TradeProfit { sell_trade_id: 1, gain: dec!(0), cost_basis: dec!(0), absolute: dec!(10), relative: Some(dec!(10)) },
            TradeProfit { sell_trade_id: 2, gain: dec!(0), cost_basis: dec!(0), absolute: dec!(-5), relative: Some(dec!(-5)) },
        ];
        let stats = Stats::from_profits(&profits);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.avg_profit, Some(dec!(10)));
        assert_eq!(stats.win_loss_ratio, Some(dec!(1)));
        assert_eq!(stats.win_rate_percent, Some(dec!(50)));
    }

    #[test]
    fn stats_on_empty_profits_are_all_none() {
        let stats = Stats::from_profits(&[]);
        assert_eq!(stats.avg_profit, None);
        assert_eq!(stats.win_loss_ratio, None);
        assert_eq!(stats.win_rate_percent, None);
    }
}
