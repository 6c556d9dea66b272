//! Shared helpers for projection arithmetic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::ProjectionError;

/// Ensures `value` is a percentage in `[0, 100]`.
pub fn validate_percentage(
    field: &str,
    value: Decimal,
) -> Result<Decimal, ProjectionError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ProjectionError::PercentageOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Ensures `value` is zero or positive.
pub fn validate_non_negative(
    field: &str,
    value: Decimal,
) -> Result<Decimal, ProjectionError> {
    if value < Decimal::ZERO {
        return Err(ProjectionError::NegativeValue {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Converts a percentage to a fraction (`20` → `0.20`).
pub fn fraction(percentage: Decimal) -> Decimal {
    percentage / Decimal::ONE_HUNDRED
}

/// Rounds up to the next whole count. Any non-zero fraction becomes one more
/// unit.
pub fn ceil_count(value: Decimal) -> Result<u64, ProjectionError> {
    value
        .ceil()
        .to_u64()
        .ok_or(ProjectionError::CountOverflow(value))
}

/// Rounds to whole currency units using half-up rounding (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use clinic_core::calculations::common::round_currency;
///
/// assert_eq!(round_currency(dec!(1499.49)), dec!(1499));
/// assert_eq!(round_currency(dec!(1499.5)), dec!(1500));
/// assert_eq!(round_currency(dec!(-1499.5)), dec!(-1500));
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
