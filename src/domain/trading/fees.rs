use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maker/taker fee rates and the nominal-amount adjustments they imply
/// (§4.5). Both rates are expected in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl FeeSchedule {
    pub fn new(maker_fee: Decimal, taker_fee: Decimal) -> Self {
        Self {
            maker_fee,
            taker_fee,
        }
    }

    /// Fiat needed to buy `nominal` of crypto aggressively (market/taker).
    pub fn taker_price(&self, nominal: Decimal) -> Decimal {
        nominal * (Decimal::ONE + self.taker_fee)
    }

    /// Fiat needed to buy `nominal` of crypto passively (limit/maker).
    pub fn maker_price(&self, nominal: Decimal) -> Decimal {
        nominal * (Decimal::ONE + self.maker_fee)
    }

    /// Fiat received selling `nominal` of crypto aggressively.
    pub fn taker_gain(&self, nominal: Decimal) -> Decimal {
        nominal * (Decimal::ONE - self.taker_fee)
    }

    /// Fiat received selling `nominal` of crypto passively.
    pub fn maker_gain(&self, nominal: Decimal) -> Decimal {
        nominal * (Decimal::ONE - self.maker_fee)
    }
}
