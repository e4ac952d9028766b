use crate::errors::{PoolStateError, TickArrayError};
use crate::math::liquidity::{add_liquidity_delta, LiquidityMathError};
use crate::math::swap::{
    compute_protocol_fee, compute_swap_step, next_fee_growth_global, ComputeStepError,
};
use crate::math::tick::{
    is_sqrt_price_in_bounds, sqrt_price_to_tick_index, tick_index_to_sqrt_price, TickMathError,
    MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64, TICK_ARRAY_SIZE,
};
use crate::quoting::pool::{Mint, PoolState};
use crate::quoting::tick_array::{TickArray, TickArraySequence};
use crate::quoting::types::{CrossedTick, Quote, SwapParams};
use crate::quoting::util::{
    max_amount_with_slippage, min_amount_with_slippage, SlippageError, BPS_DENOMINATOR,
};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum SwapError {
    #[error("tick {tick_index} is out of range")]
    TickOutOfRange { tick_index: i32 },
    #[error("sqrt price {sqrt_price} is out of range")]
    SqrtPriceOutOfRange { sqrt_price: u128 },
    #[error("no tick array covers tick {tick_index} ({amount_remaining} left to swap)")]
    InsufficientTickArrayCoverage {
        tick_index: i32,
        liquidity: u128,
        amount_remaining: u64,
    },
    #[error("crossing tick {tick_index} underflows liquidity {liquidity}")]
    LiquidityUnderflow {
        tick_index: i32,
        liquidity: u128,
        liquidity_net: i128,
    },
    #[error("crossing tick {tick_index} overflows liquidity {liquidity}")]
    LiquidityOverflow {
        tick_index: i32,
        liquidity: u128,
        liquidity_net: i128,
    },
    #[error("swap amount is zero")]
    ZeroAmount,
    #[error("pool has no liquidity at tick {tick_index}")]
    NoLiquidity { tick_index: i32, sqrt_price: u128 },
    #[error("token is not traded by the pool")]
    InvalidToken,
    #[error("invalid sqrt price limit {sqrt_price_limit}")]
    InvalidSqrtPriceLimit { sqrt_price_limit: u128 },
    #[error("slippage tolerance {slippage_tolerance_bps} bps exceeds 10000")]
    InvalidSlippageTolerance { slippage_tolerance_bps: u16 },
    #[error("price bound reached with {amount_remaining} left to swap")]
    PartialFill { amount_remaining: u64 },
    #[error("swap amount does not fit in u64")]
    AmountOverflow,
    #[error("invalid pool state")]
    PoolState(#[from] PoolStateError),
    #[error("invalid tick arrays")]
    TickArray(#[from] TickArrayError),
    #[error("failed to compute swap step")]
    ComputeStep(#[from] ComputeStepError),
}

impl SwapError {
    /// Whether quoting again with more tick arrays can succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InsufficientTickArrayCoverage { .. })
    }
}

impl From<TickMathError> for SwapError {
    fn from(err: TickMathError) -> Self {
        match err {
            TickMathError::TickOutOfRange(tick_index) => Self::TickOutOfRange { tick_index },
            TickMathError::SqrtPriceOutOfRange(sqrt_price) => {
                Self::SqrtPriceOutOfRange { sqrt_price }
            }
        }
    }
}

impl From<SlippageError> for SwapError {
    fn from(err: SlippageError) -> Self {
        match err {
            SlippageError::InvalidSlippageTolerance(slippage_tolerance_bps) => {
                Self::InvalidSlippageTolerance {
                    slippage_tolerance_bps,
                }
            }
            SlippageError::AmountOverflow => Self::AmountOverflow,
        }
    }
}

fn cross_tick(
    liquidity: u128,
    tick_index: i32,
    liquidity_net: i128,
    a_to_b: bool,
) -> Result<u128, SwapError> {
    let overflow = SwapError::LiquidityOverflow {
        tick_index,
        liquidity,
        liquidity_net,
    };

    // liquidity_net is signed for upward crossings
    let delta = if a_to_b {
        liquidity_net.checked_neg().ok_or(overflow)?
    } else {
        liquidity_net
    };

    add_liquidity_delta(liquidity, delta).map_err(|err| match err {
        LiquidityMathError::Underflow { .. } => SwapError::LiquidityUnderflow {
            tick_index,
            liquidity,
            liquidity_net,
        },
        _ => overflow,
    })
}

/// Simulates a swap against a pool snapshot and the tick arrays around its price.
///
/// The swap walks the price from one initialized tick to the next, taking the fee from the input
/// of every step and updating the active liquidity whenever a tick is crossed. Amounts match
/// on-chain execution exactly.
///
/// Without `sqrt_price_limit` the whole amount must be filled: running out of tick arrays yields
/// [`SwapError::InsufficientTickArrayCoverage`] and reaching the global price bound yields
/// [`SwapError::PartialFill`]. With a limit the swap stops there and reports what it filled.
pub fn simulate_swap(
    pool: &PoolState,
    tick_arrays: &[TickArray],
    params: SwapParams,
) -> Result<Quote, SwapError> {
    pool.validate()?;

    let SwapParams {
        amount,
        amount_specified_is_input,
        a_to_b,
        slippage_tolerance_bps,
        sqrt_price_limit,
    } = params;

    if amount == 0 {
        debug!("rejected swap of zero amount");
        return Err(SwapError::ZeroAmount);
    }

    if u64::from(slippage_tolerance_bps) > BPS_DENOMINATOR {
        return Err(SwapError::InvalidSlippageTolerance {
            slippage_tolerance_bps,
        });
    }

    if pool.liquidity == 0 {
        debug!(
            tick_index = pool.tick_current_index,
            "rejected swap against empty pool"
        );
        return Err(SwapError::NoLiquidity {
            tick_index: pool.tick_current_index,
            sqrt_price: pool.sqrt_price,
        });
    }

    let has_explicit_limit = sqrt_price_limit.is_some();
    let sqrt_price_limit = match sqrt_price_limit {
        Some(limit) => {
            let wrong_side = if a_to_b {
                limit >= pool.sqrt_price
            } else {
                limit <= pool.sqrt_price
            };
            if wrong_side || !is_sqrt_price_in_bounds(limit) {
                debug!(
                    sqrt_price_limit = limit,
                    sqrt_price = pool.sqrt_price,
                    a_to_b,
                    "rejected sqrt price limit"
                );
                return Err(SwapError::InvalidSqrtPriceLimit {
                    sqrt_price_limit: limit,
                });
            }
            limit
        }
        None if a_to_b => MIN_SQRT_PRICE_X64,
        None => MAX_SQRT_PRICE_X64,
    };

    let sequence = TickArraySequence::new(
        tick_arrays,
        pool.config.tick_spacing,
        pool.tick_current_index,
        a_to_b,
    )?;

    let mut amount_remaining = amount;
    let mut amount_calculated: u64 = 0;
    let mut sqrt_price = pool.sqrt_price;
    let mut tick_index = pool.tick_current_index;
    let mut liquidity = pool.liquidity;
    let mut fee_amount: u64 = 0;
    let mut protocol_fee_amount: u64 = 0;
    let mut fee_growth_global = pool.fee_growth_global(a_to_b);
    let mut array_index = 0usize;
    let mut crossed_ticks = Vec::new();
    let mut steps = Vec::new();

    while amount_remaining > 0 && sqrt_price != sqrt_price_limit {
        let (next_array_index, next_tick_index) = sequence
            .next_initialized_tick_index(tick_index, a_to_b, array_index)
            .ok_or(SwapError::InsufficientTickArrayCoverage {
                tick_index,
                liquidity,
                amount_remaining,
            })?;

        let next_tick_sqrt_price = tick_index_to_sqrt_price(next_tick_index)?;
        let sqrt_price_target = if a_to_b {
            next_tick_sqrt_price.max(sqrt_price_limit)
        } else {
            next_tick_sqrt_price.min(sqrt_price_limit)
        };

        let step = compute_swap_step(
            amount_remaining,
            pool.config.fee_rate,
            liquidity,
            sqrt_price,
            sqrt_price_target,
            amount_specified_is_input,
            a_to_b,
        )?;

        let (consumed, calculated) = if amount_specified_is_input {
            (
                step.amount_in.checked_add(step.fee_amount),
                Some(step.amount_out),
            )
        } else {
            (
                Some(step.amount_out),
                step.amount_in.checked_add(step.fee_amount),
            )
        };
        amount_remaining = consumed
            .and_then(|consumed| amount_remaining.checked_sub(consumed))
            .ok_or(SwapError::AmountOverflow)?;
        amount_calculated = calculated
            .and_then(|calculated| amount_calculated.checked_add(calculated))
            .ok_or(SwapError::AmountOverflow)?;

        let protocol_fee = compute_protocol_fee(step.fee_amount, pool.config.protocol_fee_rate);
        fee_amount = fee_amount
            .checked_add(step.fee_amount)
            .ok_or(SwapError::AmountOverflow)?;
        protocol_fee_amount = protocol_fee_amount
            .checked_add(protocol_fee)
            .ok_or(SwapError::AmountOverflow)?;
        fee_growth_global =
            next_fee_growth_global(fee_growth_global, step.fee_amount - protocol_fee, liquidity);

        trace!(
            amount_in = step.amount_in,
            amount_out = step.amount_out,
            fee_amount = step.fee_amount,
            sqrt_price = step.next_sqrt_price,
            liquidity,
            amount_remaining,
            "swap step"
        );
        steps.push(step);

        if step.next_sqrt_price == next_tick_sqrt_price {
            if let Some(tick) = sequence.initialized_tick(next_array_index, next_tick_index) {
                let liquidity_after =
                    cross_tick(liquidity, next_tick_index, tick.liquidity_net, a_to_b)?;

                trace!(
                    tick_index = next_tick_index,
                    liquidity_net = tick.liquidity_net,
                    liquidity_after,
                    "crossed tick"
                );
                crossed_ticks.push(CrossedTick {
                    tick_index: next_tick_index,
                    liquidity_net: tick.liquidity_net,
                    liquidity_after,
                });
                liquidity = liquidity_after;
            }

            // leaving through the edge of an array moves on to the next one
            let last_offset = TICK_ARRAY_SIZE as usize - 1;
            array_index = match sequence.tick_offset(next_array_index, next_tick_index) {
                Some(0) if a_to_b => next_array_index + 1,
                Some(offset) if !a_to_b && offset == last_offset => next_array_index + 1,
                _ => next_array_index,
            };

            tick_index = if a_to_b {
                next_tick_index - 1
            } else {
                next_tick_index
            };
        } else if step.next_sqrt_price != sqrt_price {
            tick_index = sqrt_price_to_tick_index(step.next_sqrt_price)?;
        }

        sqrt_price = step.next_sqrt_price;
    }

    if amount_remaining > 0 && !has_explicit_limit {
        debug!(amount_remaining, sqrt_price, "swap reached the price bound");
        return Err(SwapError::PartialFill { amount_remaining });
    }

    let filled = amount - amount_remaining;
    let (estimated_amount_in, estimated_amount_out, other_amount_threshold) =
        if amount_specified_is_input {
            (
                filled,
                amount_calculated,
                min_amount_with_slippage(amount_calculated, slippage_tolerance_bps)?,
            )
        } else {
            (
                amount_calculated,
                filled,
                max_amount_with_slippage(amount_calculated, slippage_tolerance_bps)?,
            )
        };

    debug!(
        a_to_b,
        amount_specified_is_input,
        estimated_amount_in,
        estimated_amount_out,
        fee_amount,
        end_tick_index = tick_index,
        crossed_ticks = crossed_ticks.len(),
        "quoted swap"
    );

    Ok(Quote {
        amount,
        amount_specified_is_input,
        a_to_b,
        sqrt_price_limit,
        estimated_amount_in,
        estimated_amount_out,
        other_amount_threshold,
        end_sqrt_price: sqrt_price,
        end_tick_index: tick_index,
        end_liquidity: liquidity,
        fee_amount,
        protocol_fee_amount,
        end_fee_growth_global: fee_growth_global,
        crossed_ticks,
        steps,
    })
}

/// Quotes paying exactly `amount` of `input_token_mint` into the pool.
pub fn swap_quote_by_input_token(
    pool: &PoolState,
    tick_arrays: &[TickArray],
    input_token_mint: &Mint,
    amount: u64,
    slippage_tolerance_bps: u16,
) -> Result<Quote, SwapError> {
    let a_to_b = pool
        .a_to_b_for_input(input_token_mint)
        .ok_or(SwapError::InvalidToken)?;

    simulate_swap(
        pool,
        tick_arrays,
        SwapParams::exact_input(amount, a_to_b, slippage_tolerance_bps),
    )
}

/// Quotes receiving exactly `amount` of `output_token_mint` from the pool.
pub fn swap_quote_by_output_token(
    pool: &PoolState,
    tick_arrays: &[TickArray],
    output_token_mint: &Mint,
    amount: u64,
    slippage_tolerance_bps: u16,
) -> Result<Quote, SwapError> {
    // receiving token B means paying token A
    let a_to_b = !pool
        .a_to_b_for_input(output_token_mint)
        .ok_or(SwapError::InvalidToken)?;

    simulate_swap(
        pool,
        tick_arrays,
        SwapParams::exact_output(amount, a_to_b, slippage_tolerance_bps),
    )
}
