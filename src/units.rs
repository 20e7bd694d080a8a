//! Conversion between microalgos and display ALGO amounts

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::DraftError;

/// Smallest units per display unit
pub const MICROALGOS_PER_ALGO: u64 = 1_000_000;

const DISPLAY_SCALE: u32 = 6;

/// Exact conversion of a microalgo amount to ALGO
pub fn microalgos_to_algos(microalgos: u64) -> Decimal {
    Decimal::from_i128_with_scale(microalgos as i128, DISPLAY_SCALE).normalize()
}

/// Parse a user-entered ALGO amount into microalgos
///
/// The amount must be strictly positive and carry at most six decimal
/// places; anything finer cannot be represented on chain.
pub fn algos_to_microalgos(raw: &str) -> Result<u64, DraftError> {
    let trimmed = raw.trim();
    let amount =
        Decimal::from_str(trimmed).map_err(|_| DraftError::InvalidAmount(raw.to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(DraftError::NonPositiveAmount);
    }
    if amount.normalize().scale() > DISPLAY_SCALE {
        return Err(DraftError::TooManyDecimals);
    }

    amount
        .checked_mul(Decimal::from(MICROALGOS_PER_ALGO))
        .and_then(|micro| micro.to_u64())
        .ok_or(DraftError::AmountOverflow)
}
