use crate::math::muldiv::{div_round_up_if, div_u256, MuldivError};
use crate::math::tick::{
    is_sqrt_price_in_bounds, sqrt_price_to_tick_index, tick_index_to_sqrt_price, TickMathError,
    MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64,
};
use crate::math::uint::{checked_shift_word_left, mul_u256, U256};
use num_traits::Zero;
use thiserror::Error;

/// 1.0 in Q64.64.
pub const SQRT_PRICE_ONE: u128 = 1 << 64;

const Q64_F64: f64 = 18446744073709551616f64;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum PriceMathError {
    #[error("no liquidity")]
    NoLiquidity,
    #[error("multiplication overflow")]
    MultiplicationOverflow,
    #[error("output amount drains the price to zero")]
    DivideByZero,
    #[error("sqrt price {0} is out of bounds")]
    SqrtPriceOutOfBounds(u128),
    #[error(transparent)]
    Muldiv(#[from] MuldivError),
}

/// Price after moving `amount` of token A in or out; rounds up so the pool keeps the dust.
pub fn next_sqrt_price_from_a_round_up(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_specified_is_input: bool,
) -> Result<u128, PriceMathError> {
    if amount == 0 {
        return Ok(sqrt_price);
    }

    if liquidity.is_zero() {
        return Err(PriceMathError::NoLiquidity);
    }

    let product = mul_u256(sqrt_price, u128::from(amount));
    let numerator = checked_shift_word_left(mul_u256(liquidity, sqrt_price))
        .ok_or(PriceMathError::MultiplicationOverflow)?;
    let liquidity_shift_left = U256::from(liquidity) << 64;

    let denominator = if amount_specified_is_input {
        liquidity_shift_left + product
    } else {
        if liquidity_shift_left <= product {
            return Err(PriceMathError::DivideByZero);
        }
        liquidity_shift_left - product
    };

    let price = div_u256(numerator, denominator, true)?;
    if !is_sqrt_price_in_bounds(price) {
        return Err(PriceMathError::SqrtPriceOutOfBounds(price));
    }

    Ok(price)
}

/// Price after moving `amount` of token B in or out; rounds down so the pool keeps the dust.
pub fn next_sqrt_price_from_b_round_down(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_specified_is_input: bool,
) -> Result<u128, PriceMathError> {
    if liquidity.is_zero() {
        return Err(PriceMathError::NoLiquidity);
    }

    let amount_x64 = u128::from(amount) << 64;
    let delta = div_round_up_if(amount_x64, liquidity, !amount_specified_is_input)?;

    let price = if amount_specified_is_input {
        sqrt_price
            .checked_add(delta)
            .ok_or(PriceMathError::SqrtPriceOutOfBounds(MAX_SQRT_PRICE_X64))?
    } else {
        sqrt_price
            .checked_sub(delta)
            .ok_or(PriceMathError::SqrtPriceOutOfBounds(MIN_SQRT_PRICE_X64))?
    };

    if !is_sqrt_price_in_bounds(price) {
        return Err(PriceMathError::SqrtPriceOutOfBounds(price));
    }

    Ok(price)
}

/// Dispatches on which token `amount` is denominated in.
pub fn next_sqrt_price(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<u128, PriceMathError> {
    if amount_specified_is_input == a_to_b {
        next_sqrt_price_from_a_round_up(sqrt_price, liquidity, amount, amount_specified_is_input)
    } else {
        next_sqrt_price_from_b_round_down(sqrt_price, liquidity, amount, amount_specified_is_input)
    }
}

/// Human price of token A in units of token B.
#[must_use]
pub fn sqrt_price_to_price(sqrt_price: u128, decimals_a: u8, decimals_b: u8) -> f64 {
    let sqrt_price = sqrt_price as f64 / Q64_F64;
    sqrt_price * sqrt_price * 10f64.powi(i32::from(decimals_a) - i32::from(decimals_b))
}

/// Inverse of [`sqrt_price_to_price`], rounded down.
pub fn price_to_sqrt_price(
    price: f64,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<u128, TickMathError> {
    let scaled = price * 10f64.powi(i32::from(decimals_b) - i32::from(decimals_a));
    let sqrt_price = (scaled.sqrt() * Q64_F64).floor();

    if !sqrt_price.is_finite()
        || sqrt_price < MIN_SQRT_PRICE_X64 as f64
        || sqrt_price > MAX_SQRT_PRICE_X64 as f64
    {
        return Err(TickMathError::SqrtPriceOutOfRange(sqrt_price as u128));
    }

    Ok(sqrt_price as u128)
}

/// Price of token B in units of token A.
#[must_use]
pub fn invert_price(price: f64) -> f64 {
    1.0 / price
}

pub fn tick_index_to_price(
    tick_index: i32,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<f64, TickMathError> {
    Ok(sqrt_price_to_price(
        tick_index_to_sqrt_price(tick_index)?,
        decimals_a,
        decimals_b,
    ))
}

pub fn price_to_tick_index(
    price: f64,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<i32, TickMathError> {
    sqrt_price_to_tick_index(price_to_sqrt_price(price, decimals_a, decimals_b)?)
}
