use crate::math::delta::{
    amount_delta_a, amount_delta_b, try_amount_delta_a, try_amount_delta_b, AmountDelta,
    AmountDeltaError,
};
use crate::math::muldiv::{muldiv, MuldivError};
use crate::math::sqrt_price::{next_sqrt_price, PriceMathError};
use thiserror::Error;

/// Denominator of `fee_rate`: 3000 is 0.3%.
pub const FEE_RATE_DENOMINATOR: u128 = 1_000_000;
/// Denominator of `protocol_fee_rate`, a share of the swap fee.
pub const PROTOCOL_FEE_RATE_DENOMINATOR: u128 = 10_000;

/// Outcome of swapping within a single constant-liquidity segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapStep {
    /// Input consumed by the price move, excluding fee.
    pub amount_in: u64,
    pub amount_out: u64,
    pub next_sqrt_price: u128,
    pub fee_amount: u64,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum ComputeStepError {
    #[error("amount does not fit in u64")]
    AmountCastOverflow,
    #[error("amount delta error")]
    AmountDelta(#[from] AmountDeltaError),
    #[error("price math error")]
    PriceMath(#[from] PriceMathError),
    #[error(transparent)]
    Muldiv(#[from] MuldivError),
}

fn amount_fixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<u64, AmountDeltaError> {
    if a_to_b == amount_specified_is_input {
        amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    } else {
        amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    }
}

fn try_amount_fixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<AmountDelta, AmountDeltaError> {
    if a_to_b == amount_specified_is_input {
        try_amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    } else {
        try_amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    }
}

fn amount_unfixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<u64, AmountDeltaError> {
    if a_to_b == amount_specified_is_input {
        amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            !amount_specified_is_input,
        )
    } else {
        amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            !amount_specified_is_input,
        )
    }
}

fn to_u64(value: u128) -> Result<u64, ComputeStepError> {
    u64::try_from(value).map_err(|_| ComputeStepError::AmountCastOverflow)
}

/// Swaps `amount_remaining` between the current price and `sqrt_price_target`.
///
/// The "fixed" token is the one `amount_remaining` is denominated in. The fee is taken from the
/// input before the price moves; input amounts round up and output amounts round down.
pub fn compute_swap_step(
    amount_remaining: u64,
    fee_rate: u16,
    liquidity: u128,
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<SwapStep, ComputeStepError> {
    // u16 keeps the fee rate below the denominator
    let fee_rate_wide = u128::from(fee_rate);

    let initial_amount_fixed_delta = try_amount_fixed_delta(
        sqrt_price_current,
        sqrt_price_target,
        liquidity,
        amount_specified_is_input,
        a_to_b,
    )?;

    let amount_calc = if amount_specified_is_input {
        to_u64(muldiv(
            u128::from(amount_remaining),
            FEE_RATE_DENOMINATOR - fee_rate_wide,
            FEE_RATE_DENOMINATOR,
            false,
        )?)?
    } else {
        amount_remaining
    };

    let next_sqrt_price = if initial_amount_fixed_delta.lte(amount_calc) {
        sqrt_price_target
    } else {
        next_sqrt_price(
            sqrt_price_current,
            liquidity,
            amount_calc,
            amount_specified_is_input,
            a_to_b,
        )?
    };

    let is_max_swap = next_sqrt_price == sqrt_price_target;

    let amount_unfixed_delta = amount_unfixed_delta(
        sqrt_price_current,
        next_sqrt_price,
        liquidity,
        amount_specified_is_input,
        a_to_b,
    )?;

    // a partial step moved the price less than the whole segment, so the fixed side is recomputed
    let amount_fixed_delta = match initial_amount_fixed_delta {
        AmountDelta::Valid(value) if is_max_swap => value,
        _ => amount_fixed_delta(
            sqrt_price_current,
            next_sqrt_price,
            liquidity,
            amount_specified_is_input,
            a_to_b,
        )?,
    };

    let (amount_in, mut amount_out) = if amount_specified_is_input {
        (amount_fixed_delta, amount_unfixed_delta)
    } else {
        (amount_unfixed_delta, amount_fixed_delta)
    };

    if !amount_specified_is_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if amount_specified_is_input && !is_max_swap {
        amount_remaining - amount_in
    } else {
        to_u64(muldiv(
            u128::from(amount_in),
            fee_rate_wide,
            FEE_RATE_DENOMINATOR - fee_rate_wide,
            true,
        )?)?
    };

    Ok(SwapStep {
        amount_in,
        amount_out,
        next_sqrt_price,
        fee_amount,
    })
}

/// Share of `fee_amount` kept by the protocol, rounded down.
#[must_use]
pub fn compute_protocol_fee(fee_amount: u64, protocol_fee_rate: u16) -> u64 {
    // protocol_fee_rate <= denominator keeps the quotient within fee_amount
    let fee =
        u128::from(fee_amount) * u128::from(protocol_fee_rate) / PROTOCOL_FEE_RATE_DENOMINATOR;
    u64::try_from(fee).unwrap_or(fee_amount)
}

/// Advances a Q64.64 fee growth accumulator by `fee_amount` spread over `liquidity`.
///
/// Wraps on overflow like the on-chain accumulator. Zero liquidity leaves it unchanged.
#[must_use]
pub fn next_fee_growth_global(fee_growth_global: u128, fee_amount: u64, liquidity: u128) -> u128 {
    if liquidity == 0 {
        return fee_growth_global;
    }
    fee_growth_global.wrapping_add((u128::from(fee_amount) << 64) / liquidity)
}
