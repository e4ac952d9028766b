use crate::math::delta::AmountDeltaError;
use crate::math::liquidity::{
    liquidity_from_token_a, liquidity_from_token_b, token_amounts_for_liquidity,
    LiquidityMathError,
};
use crate::math::tick::{
    is_tick_index_in_bounds, is_tick_initializable, tick_index_to_sqrt_price, TickMathError,
};
use crate::quoting::pool::PoolState;
use crate::quoting::util::{max_amount_with_slippage, min_amount_with_slippage, SlippageError};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum LiquidityQuoteError {
    #[error("liquidity amount is zero")]
    LiquidityZero,
    #[error("invalid tick range [{tick_lower}, {tick_upper})")]
    InvalidTickRange { tick_lower: i32, tick_upper: i32 },
    #[error("slippage tolerance {0} bps exceeds 10000")]
    InvalidSlippageTolerance(u16),
    #[error("token amount does not fit in u64")]
    TokenMaxExceeded,
    #[error("liquidity math error")]
    LiquidityMath(#[from] LiquidityMathError),
    #[error(transparent)]
    TickMath(#[from] TickMathError),
}

impl From<SlippageError> for LiquidityQuoteError {
    fn from(err: SlippageError) -> Self {
        match err {
            SlippageError::InvalidSlippageTolerance(bps) => Self::InvalidSlippageTolerance(bps),
            SlippageError::AmountOverflow => Self::TokenMaxExceeded,
        }
    }
}

// Token amounts to deposit for a liquidity amount, with slippage-adjusted maximums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncreaseLiquidityQuote {
    pub liquidity_amount: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_max_a: u64,
    pub token_max_b: u64,
}

// Token amounts withdrawn for a liquidity amount, with slippage-adjusted minimums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecreaseLiquidityQuote {
    pub liquidity_amount: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_min_a: u64,
    pub token_min_b: u64,
}

fn range_sqrt_prices(
    pool: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<(u128, u128), LiquidityQuoteError> {
    let spacing = pool.config.tick_spacing;
    let valid = tick_lower < tick_upper
        && is_tick_index_in_bounds(tick_lower)
        && is_tick_index_in_bounds(tick_upper)
        && is_tick_initializable(tick_lower, spacing)
        && is_tick_initializable(tick_upper, spacing);

    if !valid {
        return Err(LiquidityQuoteError::InvalidTickRange {
            tick_lower,
            tick_upper,
        });
    }

    Ok((
        tick_index_to_sqrt_price(tick_lower)?,
        tick_index_to_sqrt_price(tick_upper)?,
    ))
}

fn token_amounts(
    pool: &PoolState,
    liquidity: u128,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
    round_up: bool,
) -> Result<(u64, u64), LiquidityQuoteError> {
    token_amounts_for_liquidity(
        liquidity,
        pool.sqrt_price,
        sqrt_price_lower,
        sqrt_price_upper,
        round_up,
    )
    .map_err(|err| match err {
        LiquidityMathError::AmountDelta(AmountDeltaError::TokenMaxExceeded) => {
            LiquidityQuoteError::TokenMaxExceeded
        }
        err => err.into(),
    })
}

/// Tokens needed to add `liquidity` to a position over `[tick_lower, tick_upper)`.
///
/// Deposits round up. Below the range only token A is needed, above it only token B.
pub fn increase_liquidity_quote(
    liquidity: u128,
    slippage_tolerance_bps: u16,
    pool: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<IncreaseLiquidityQuote, LiquidityQuoteError> {
    if liquidity == 0 {
        return Err(LiquidityQuoteError::LiquidityZero);
    }

    let (sqrt_price_lower, sqrt_price_upper) = range_sqrt_prices(pool, tick_lower, tick_upper)?;
    let (token_est_a, token_est_b) =
        token_amounts(pool, liquidity, sqrt_price_lower, sqrt_price_upper, true)?;

    Ok(IncreaseLiquidityQuote {
        liquidity_amount: liquidity,
        token_est_a,
        token_est_b,
        token_max_a: max_amount_with_slippage(token_est_a, slippage_tolerance_bps)?,
        token_max_b: max_amount_with_slippage(token_est_b, slippage_tolerance_bps)?,
    })
}

/// Largest position that `amount` of token A can fund, quoted with
/// [`increase_liquidity_quote`].
pub fn increase_liquidity_quote_by_token_a(
    amount: u64,
    slippage_tolerance_bps: u16,
    pool: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<IncreaseLiquidityQuote, LiquidityQuoteError> {
    let (sqrt_price_lower, sqrt_price_upper) = range_sqrt_prices(pool, tick_lower, tick_upper)?;
    if pool.sqrt_price >= sqrt_price_upper {
        return Err(LiquidityQuoteError::LiquidityZero);
    }

    let liquidity = liquidity_from_token_a(
        amount,
        pool.sqrt_price.max(sqrt_price_lower),
        sqrt_price_upper,
    )?;

    increase_liquidity_quote(liquidity, slippage_tolerance_bps, pool, tick_lower, tick_upper)
}

/// Largest position that `amount` of token B can fund, quoted with
/// [`increase_liquidity_quote`].
pub fn increase_liquidity_quote_by_token_b(
    amount: u64,
    slippage_tolerance_bps: u16,
    pool: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<IncreaseLiquidityQuote, LiquidityQuoteError> {
    let (sqrt_price_lower, sqrt_price_upper) = range_sqrt_prices(pool, tick_lower, tick_upper)?;
    if pool.sqrt_price <= sqrt_price_lower {
        return Err(LiquidityQuoteError::LiquidityZero);
    }

    let liquidity = liquidity_from_token_b(
        amount,
        sqrt_price_lower,
        pool.sqrt_price.min(sqrt_price_upper),
    )?;

    increase_liquidity_quote(liquidity, slippage_tolerance_bps, pool, tick_lower, tick_upper)
}

/// Tokens returned for removing `liquidity` from a position; withdrawals round down.
pub fn decrease_liquidity_quote(
    liquidity: u128,
    slippage_tolerance_bps: u16,
    pool: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<DecreaseLiquidityQuote, LiquidityQuoteError> {
    if liquidity == 0 {
        return Err(LiquidityQuoteError::LiquidityZero);
    }

    let (sqrt_price_lower, sqrt_price_upper) = range_sqrt_prices(pool, tick_lower, tick_upper)?;
    let (token_est_a, token_est_b) =
        token_amounts(pool, liquidity, sqrt_price_lower, sqrt_price_upper, false)?;

    Ok(DecreaseLiquidityQuote {
        liquidity_amount: liquidity,
        token_est_a,
        token_est_b,
        token_min_a: min_amount_with_slippage(token_est_a, slippage_tolerance_bps)?,
        token_min_b: min_amount_with_slippage(token_est_b, slippage_tolerance_bps)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::sqrt_price::SQRT_PRICE_ONE;
    use crate::quoting::pool::PoolConfig;

    fn pool_state(tick: i32) -> PoolState {
        let sqrt_price = tick_index_to_sqrt_price(tick).unwrap();
        PoolState::new(PoolConfig::new(64, 3000, 0).unwrap(), sqrt_price, tick, 10_000_000)
            .unwrap()
    }

    mod increase {
        use super::*;

        #[test]
        fn in_range() {
            let quote = increase_liquidity_quote(10_000_000, 100, &pool_state(0), -2816, 2816).unwrap();
            assert_eq!(
                quote,
                IncreaseLiquidityQuote {
                    liquidity_amount: 10_000_000,
                    token_est_a: 1_313_309,
                    token_est_b: 1_313_309,
                    token_max_a: 1_326_443,
                    token_max_b: 1_326_443,
                }
            );
        }

        #[test]
        fn below_range_needs_only_token_a() {
            let quote = increase_liquidity_quote(10_000_000, 0, &pool_state(-64), 0, 2816).unwrap();
            assert_eq!(quote.token_est_a, 1_313_309);
            assert_eq!(quote.token_est_b, 0);
            assert_eq!(quote.token_max_a, 1_313_309);
        }

        #[test]
        fn above_range_needs_only_token_b() {
            let quote = increase_liquidity_quote(10_000_000, 0, &pool_state(4032), 0, 2816).unwrap();
            assert_eq!(quote.token_est_a, 0);
            assert_eq!(quote.token_est_b, 1_511_863);
        }

        #[test]
        fn by_single_token() {
            let pool = pool_state(0);
            let by_a = increase_liquidity_quote_by_token_a(1_000_000, 0, &pool, -2816, 2816).unwrap();
            assert_eq!(by_a.liquidity_amount, 7_614_356);
            assert_eq!(by_a.token_est_a, 1_000_000);

            let by_b = increase_liquidity_quote_by_token_b(1_000_000, 0, &pool, -2816, 2816).unwrap();
            assert_eq!(by_b.liquidity_amount, 7_614_356);
            assert_eq!(by_b.token_est_b, 1_000_000);
        }

        #[test]
        fn single_token_outside_range() {
            let pool = pool_state(0);
            assert_eq!(
                increase_liquidity_quote_by_token_a(1_000, 0, &pool, -2816, 0),
                Err(LiquidityQuoteError::LiquidityZero)
            );
            assert_eq!(
                increase_liquidity_quote_by_token_b(1_000, 0, &pool, 0, 2816),
                Err(LiquidityQuoteError::LiquidityZero)
            );
        }

        #[test]
        fn token_max_exceeded() {
            assert_eq!(
                increase_liquidity_quote(u128::MAX, 0, &pool_state(0), -2816, 2816),
                Err(LiquidityQuoteError::TokenMaxExceeded)
            );
        }
    }

    mod decrease {
        use super::*;

        #[test]
        fn in_range_rounds_down() {
            let quote = decrease_liquidity_quote(10_000_000, 100, &pool_state(0), -2816, 2816).unwrap();
            assert_eq!(
                quote,
                DecreaseLiquidityQuote {
                    liquidity_amount: 10_000_000,
                    token_est_a: 1_313_308,
                    token_est_b: 1_313_308,
                    token_min_a: 1_300_174,
                    token_min_b: 1_300_174,
                }
            );
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn zero_liquidity() {
            let pool = pool_state(0);
            assert_eq!(
                increase_liquidity_quote(0, 0, &pool, -64, 64),
                Err(LiquidityQuoteError::LiquidityZero)
            );
            assert_eq!(
                decrease_liquidity_quote(0, 0, &pool, -64, 64),
                Err(LiquidityQuoteError::LiquidityZero)
            );
        }

        #[test]
        fn tick_range() {
            let pool = pool_state(0);
            for (tick_lower, tick_upper) in [(64, 64), (128, 64), (-64, 100), (-443_648, 64)] {
                assert_eq!(
                    increase_liquidity_quote(1, 0, &pool, tick_lower, tick_upper),
                    Err(LiquidityQuoteError::InvalidTickRange {
                        tick_lower,
                        tick_upper
                    })
                );
            }
        }

        #[test]
        fn slippage() {
            assert_eq!(
                decrease_liquidity_quote(1, 10_001, &pool_state(0), -64, 64),
                Err(LiquidityQuoteError::InvalidSlippageTolerance(10_001))
            );
        }

        #[test]
        fn price_one_fixture() {
            assert_eq!(pool_state(0).sqrt_price, SQRT_PRICE_ONE);
        }
    }
}
