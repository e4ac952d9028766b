use crate::math::uint::{mul_u256, try_into_u128, U256};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum MuldivError {
    #[error("muldiv overflow")]
    Overflow,
    #[error("muldiv denominator is zero")]
    DenominatorZero,
}

pub fn muldiv(x: u128, y: u128, d: u128, round_up: bool) -> Result<u128, MuldivError> {
    if d == 0 {
        return Err(MuldivError::DenominatorZero);
    }

    div_u256(mul_u256(x, y), U256::from(d), round_up)
}

/// Divides a wide numerator, narrowing the quotient back to u128.
pub fn div_u256(numerator: U256, denominator: U256, round_up: bool) -> Result<u128, MuldivError> {
    if denominator.is_zero() {
        return Err(MuldivError::DenominatorZero);
    }

    let (quotient, remainder) = numerator.div_mod(denominator);

    let result = if round_up && !remainder.is_zero() {
        quotient
            .checked_add(U256::one())
            .ok_or(MuldivError::Overflow)?
    } else {
        quotient
    };

    try_into_u128(result).ok_or(MuldivError::Overflow)
}

pub fn div_round_up_if(n: u128, d: u128, round_up: bool) -> Result<u128, MuldivError> {
    if d == 0 {
        return Err(MuldivError::DenominatorZero);
    }

    let quotient = n / d;
    if round_up && n % d != 0 {
        Ok(quotient + 1)
    } else {
        Ok(quotient)
    }
}
