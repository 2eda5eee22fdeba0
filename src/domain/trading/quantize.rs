//! Decimal quantization per §3: floor on input amounts, round-half-up on
//! derived amounts (fill prices, fees).

use rust_decimal::{Decimal, RoundingStrategy};

/// Truncate `value` toward zero at `precision` decimal places.
pub fn quantize_floor(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::ToZero)
}

/// Round `value` to `precision` decimal places, ties away from zero.
pub fn quantize_round_half_up(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}
