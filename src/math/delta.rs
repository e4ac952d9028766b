use crate::math::muldiv::MuldivError;
use crate::math::uint::{checked_shift_word_left, mul_u256, try_into_u64, U256};
use num_traits::Zero;
use thiserror::Error;

const Q64_MASK: u128 = u64::MAX as u128;

/// Token amount for a sqrt price interval, which may be too large to ever be swapped.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AmountDelta {
    Valid(u64),
    ExceedsMax,
}

impl AmountDelta {
    #[must_use]
    pub fn lte(self, other: u64) -> bool {
        match self {
            AmountDelta::Valid(value) => value <= other,
            AmountDelta::ExceedsMax => false,
        }
    }

    #[must_use]
    pub fn exceeds_max(self) -> bool {
        matches!(self, AmountDelta::ExceedsMax)
    }

    pub fn value(self) -> Result<u64, AmountDeltaError> {
        match self {
            AmountDelta::Valid(value) => Ok(value),
            AmountDelta::ExceedsMax => Err(AmountDeltaError::TokenMaxExceeded),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum AmountDeltaError {
    #[error("sqrt price is zero")]
    ZeroSqrtPrice,
    #[error("multiplication overflow")]
    MultiplicationOverflow,
    #[error("token amount exceeds u64")]
    TokenMaxExceeded,
    #[error(transparent)]
    Muldiv(#[from] MuldivError),
}

fn sort_sqrt_prices(sqrt_price_0: u128, sqrt_price_1: u128) -> (u128, u128) {
    if sqrt_price_0 < sqrt_price_1 {
        (sqrt_price_0, sqrt_price_1)
    } else {
        (sqrt_price_1, sqrt_price_0)
    }
}

/// Amount of token A between two sqrt prices: `L * (upper - lower) * 2^64 / (upper * lower)`.
pub fn try_amount_delta_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<AmountDelta, AmountDeltaError> {
    let (lower, upper) = sort_sqrt_prices(sqrt_price_0, sqrt_price_1);

    if lower.is_zero() {
        return Err(AmountDeltaError::ZeroSqrtPrice);
    }

    let numerator = checked_shift_word_left(mul_u256(liquidity, upper - lower))
        .ok_or(AmountDeltaError::MultiplicationOverflow)?;
    let denominator = mul_u256(upper, lower);

    let (quotient, remainder) = numerator.div_mod(denominator);
    let result = if round_up && !remainder.is_zero() {
        quotient + U256::one()
    } else {
        quotient
    };

    Ok(try_into_u64(result).map_or(AmountDelta::ExceedsMax, AmountDelta::Valid))
}

/// Amount of token B between two sqrt prices: `L * (upper - lower) / 2^64`.
pub fn try_amount_delta_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<AmountDelta, AmountDeltaError> {
    let (lower, upper) = sort_sqrt_prices(sqrt_price_0, sqrt_price_1);
    let diff = upper - lower;

    if liquidity.is_zero() || diff.is_zero() {
        return Ok(AmountDelta::Valid(0));
    }

    let Some(product) = liquidity.checked_mul(diff) else {
        return Ok(AmountDelta::ExceedsMax);
    };

    let Ok(result) = u64::try_from(product >> 64) else {
        return Ok(AmountDelta::ExceedsMax);
    };

    if round_up && product & Q64_MASK != 0 {
        Ok(result
            .checked_add(1)
            .map_or(AmountDelta::ExceedsMax, AmountDelta::Valid))
    } else {
        Ok(AmountDelta::Valid(result))
    }
}

pub fn amount_delta_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, AmountDeltaError> {
    try_amount_delta_a(sqrt_price_0, sqrt_price_1, liquidity, round_up)?.value()
}

pub fn amount_delta_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, AmountDeltaError> {
    try_amount_delta_b(sqrt_price_0, sqrt_price_1, liquidity, round_up)?.value()
}


#[cfg(test)]
mod amount_delta_b_tests {
    use super::*;

    const ONE: u128 = 1 << 64;

    #[test]
    fn price_up() {
        assert_eq!(amount_delta_b(ONE, 2 * ONE, 1000, false).unwrap(), 1000);
        assert_eq!(amount_delta_b(2 * ONE, ONE, 1000, true).unwrap(), 1000);
    }

    #[test]
    fn rounding() {
        assert_eq!(amount_delta_b(ONE, ONE + 1, 1000, false).unwrap(), 0);
        assert_eq!(amount_delta_b(ONE, ONE + 1, 1000, true).unwrap(), 1);
    }

    #[test]
    fn zero_liquidity() {
        assert_eq!(amount_delta_b(ONE, 2 * ONE, 0, true).unwrap(), 0);
    }

    #[test]
    fn product_overflow() {
        let delta = try_amount_delta_b(ONE, 3 * ONE, u128::MAX, false).unwrap();
        assert_eq!(delta, AmountDelta::ExceedsMax);
    }

    #[test]
    fn result_exceeds_u64() {
        // 2^64 * 2^64 / 2^64 = 2^64, one past u64::MAX
        let delta = try_amount_delta_b(ONE, 2 * ONE, ONE, false).unwrap();
        assert!(delta.exceeds_max());
    }

    #[test]
    fn round_up_from_max() {
        // product = (2^64 - 1) * 2^64 + 1: floor is u64::MAX, rounding up overflows
        let liquidity = ONE + 1;
        let diff = ONE - 1;
        assert_eq!(
            try_amount_delta_b(ONE, ONE + diff, liquidity, false).unwrap(),
            AmountDelta::Valid(u64::MAX)
        );
        assert_eq!(
            try_amount_delta_b(ONE, ONE + diff, liquidity, true).unwrap(),
            AmountDelta::ExceedsMax
        );
    }

    #[test]
    fn lte() {
        assert!(AmountDelta::Valid(5).lte(5));
        assert!(!AmountDelta::Valid(6).lte(5));
    }
}
