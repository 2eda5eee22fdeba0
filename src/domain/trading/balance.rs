use crate::domain::errors::OrderError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dual-asset (fiat, crypto) account with a held-vs-available partition.
///
/// Invariants, always: `0 <= available_fiat <= fiat` and
/// `0 <= available_crypto <= crypto`. "Hold" decreases available only;
/// "withdraw" decreases both (the withdrawn portion was already held);
/// "release" returns held funds to available; "deposit" increases both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub fiat: Decimal,
    pub available_fiat: Decimal,
    pub crypto: Decimal,
    pub available_crypto: Decimal,
}

impl Balance {
    pub fn new(starting_fiat: Decimal) -> Self {
        Self {
            fiat: starting_fiat,
            available_fiat: starting_fiat,
            crypto: Decimal::ZERO,
            available_crypto: Decimal::ZERO,
        }
    }

    pub fn hold_fiat(&mut self, amount: Decimal) -> Result<(), OrderError> {
        if amount > self.available_fiat {
            return Err(OrderError::InsufficientFunds {
                need: amount,
                available: self.available_fiat,
            });
        }
        self.available_fiat -= amount;
        Ok(())
    }

    pub fn hold_crypto(&mut self, amount: Decimal) -> Result<(), OrderError> {
        if amount > self.available_crypto {
            return Err(OrderError::InsufficientFunds {
                need: amount,
                available: self.available_crypto,
            });
        }
        self.available_crypto -= amount;
        Ok(())
    }

    pub fn release_fiat(&mut self, amount: Decimal) {
        self.available_fiat += amount;
    }

    pub fn release_crypto(&mut self, amount: Decimal) {
        self.available_crypto += amount;
    }

    pub fn withdraw_fiat(&mut self, amount: Decimal) {
        self.fiat -= amount;
    }

    pub fn withdraw_crypto(&mut self, amount: Decimal) {
        self.crypto -= amount;
    }

    pub fn deposit_fiat(&mut self, amount: Decimal) {
        self.fiat += amount;
        self.available_fiat += amount;
    }

    pub fn deposit_crypto(&mut self, amount: Decimal) {
        self.crypto += amount;
        self.available_crypto += amount;
    }

    /// `0 <= available_* <= *` for both assets.
    pub fn is_consistent(&self) -> bool {
        self.available_fiat >= Decimal::ZERO
            && self.available_fiat <= self.fiat
            && self.available_crypto >= Decimal::ZERO
            && self.available_crypto <= self.crypto
    }
}
